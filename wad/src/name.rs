use super::errors::{Error, ErrorKind, Result};
use serde::de::{Deserialize, Deserializer, Error as SerdeDeError};
use serde::ser::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::str::{self, FromStr};

/// An 8-byte, null padded lump or texture name.
///
/// Bytes after the first null are always zero, so two names compare equal iff their trimmed
/// strings do. Decoding keeps the bytes verbatim; parsing from a `str` upper-cases, since that
/// is how names are spelled in every archive.
#[derive(Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Default)]
pub struct WadName([u8; 8]);

impl WadName {
    pub fn from_bytes(value: &[u8]) -> Result<WadName> {
        let mut name = [0u8; 8];
        let mut nulled = false;
        for (dest, &src) in name.iter_mut().zip(value.iter()) {
            if src == b'\0' {
                nulled = true;
                break;
            }
            ensure!(
                src.is_ascii(),
                ErrorKind::invalid_byte_in_wad_name(src, value)
            );
            *dest = src;
        }

        ensure!(nulled || value.len() <= 8, ErrorKind::wad_name_too_long(value));
        Ok(WadName(name))
    }

    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        str::from_utf8(&self.0[..len]).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl FromStr for WadName {
    type Err = Error;
    fn from_str(value: &str) -> Result<WadName> {
        WadName::from_bytes(value.to_ascii_uppercase().as_bytes())
    }
}

impl Display for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

impl Deref for WadName {
    type Target = [u8; 8];
    fn deref(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Debug for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "WadName({:?})", self.as_str())
    }
}

impl PartialEq<[u8; 8]> for WadName {
    fn eq(&self, rhs: &[u8; 8]) -> bool {
        self.deref() == rhs
    }
}

impl PartialEq<str> for WadName {
    fn eq(&self, rhs: &str) -> bool {
        self.as_str() == rhs
    }
}

impl<'a> PartialEq<&'a str> for WadName {
    fn eq(&self, rhs: &&'a str) -> bool {
        self.as_str() == *rhs
    }
}

impl Borrow<[u8; 8]> for WadName {
    fn borrow(&self) -> &[u8; 8] {
        self.deref()
    }
}

impl<'de> Deserialize<'de> for WadName {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WadName::from_bytes(&<[u8; 8]>::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

impl Serialize for WadName {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

pub trait IntoWadName {
    fn into_wad_name(self) -> Result<WadName>;
}

impl IntoWadName for &str {
    fn into_wad_name(self) -> Result<WadName> {
        WadName::from_str(self)
    }
}

impl IntoWadName for &String {
    fn into_wad_name(self) -> Result<WadName> {
        WadName::from_str(self)
    }
}

impl IntoWadName for WadName {
    fn into_wad_name(self) -> Result<WadName> {
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::super::errors::ErrorKind;
    use super::{IntoWadName, WadName};
    use std::str::FromStr;

    #[test]
    fn test_wad_name() {
        assert_eq!(&WadName::from_str("").unwrap(), b"\0\0\0\0\0\0\0\0");
        assert_eq!(&WadName::from_str("\0").unwrap(), b"\0\0\0\0\0\0\0\0");
        assert_eq!(
            &WadName::from_str("\01234567").unwrap(),
            b"\0\0\0\0\0\0\0\0"
        );
        assert_eq!(&WadName::from_str("A").unwrap(), b"A\0\0\0\0\0\0\0");
        assert_eq!(&WadName::from_str("1234567").unwrap(), b"1234567\0");
        assert_eq!(&WadName::from_str("12345678").unwrap(), b"12345678");
        assert_eq!(&WadName::from_str("123\05678").unwrap(), b"123\0\0\0\0\0");
        assert_eq!(&WadName::from_str("e1m1").unwrap(), b"E1M1\0\0\0\0");
        assert_eq!(&WadName::from_str("-").unwrap(), b"-\0\0\0\0\0\0\0");
        assert_eq!(&WadName::from_bytes(b"$$ASDF_").unwrap(), b"$$ASDF_\0");
        assert_eq!(&WadName::from_bytes(b"VERTEXES").unwrap(), b"VERTEXES");

        assert!(WadName::from_bytes(b"123456789").is_err());
        assert!(WadName::from_bytes(b"1234\xfb").is_err());
        assert!(WadName::from_bytes(b"\xff123").is_err());
        assert!(WadName::from_bytes(b"123456789\0").is_err());
    }

    #[test]
    fn trimmed_at_first_null() {
        let name = WadName::from_bytes(b"SEGS\0\0\0\0").unwrap();
        assert_eq!(name.as_str(), "SEGS");
        assert_eq!(name.to_string(), "SEGS");
        assert_eq!(name, "SEGS");
        assert!(!name.is_empty());
        assert!(WadName::default().is_empty());
    }

    #[test]
    fn into_wad_name_parses_strings() {
        let name = WadName::from_str("E1M1").unwrap();
        assert_eq!("e1m1".into_wad_name().unwrap(), name);
        assert_eq!((&"E1M1".to_owned()).into_wad_name().unwrap(), name);
        assert_eq!(name.into_wad_name().unwrap(), name);
        assert_eq!(
            "TOOLONGNAME".into_wad_name().unwrap_err().kind(),
            &ErrorKind::CorruptWad("Wad name too long `TOOLONGNAME`.".to_owned())
        );
    }
}
