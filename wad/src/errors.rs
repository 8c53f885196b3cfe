use failure::{Backtrace, Context, Fail};
use std::fmt;
use std::result::Result as StdResult;

pub type Result<T> = StdResult<T, Error>;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Corrupt WAD file: {}", _0)]
    CorruptWad(String),

    #[fail(display = "I/O WAD error: {}", _0)]
    Io(String),

    #[fail(display = "No level named `{}` in WAD.", _0)]
    MissingLevel(String),
}

impl ErrorKind {
    pub(crate) fn invalid_byte_in_wad_name(byte: u8, bytes: &[u8]) -> ErrorKind {
        ErrorKind::CorruptWad(format!(
            "Invalid character `{}` in wad name `{}`.",
            char::from(byte).escape_default(),
            String::from_utf8_lossy(bytes),
        ))
    }

    pub(crate) fn wad_name_too_long(bytes: &[u8]) -> ErrorKind {
        ErrorKind::CorruptWad(format!(
            "Wad name too long `{}`.",
            String::from_utf8_lossy(bytes)
        ))
    }

    pub(crate) fn bad_wad_header_identifier(identifier: &[u8]) -> ErrorKind {
        ErrorKind::CorruptWad(format!(
            "Invalid header identifier: {}",
            String::from_utf8_lossy(identifier)
        ))
    }

    pub(crate) fn on_file_open() -> ErrorKind {
        ErrorKind::Io("Failed to open file.".to_owned())
    }

    pub(crate) fn seeking_to_header() -> ErrorKind {
        ErrorKind::Io("Seeking to WAD header failed.".to_owned())
    }

    pub(crate) fn seeking_to_info_table_offset(offset: u32) -> ErrorKind {
        ErrorKind::Io(format!(
            "Seeking to `info_table_offset` at {} failed",
            offset
        ))
    }

    pub(crate) fn seeking_to_lump(index: usize, name: &str) -> ErrorKind {
        ErrorKind::Io(format!("Seeking to lump {}, `{}` failed", index, name))
    }

    pub(crate) fn reading_lump(index: usize, name: &str) -> ErrorKind {
        ErrorKind::Io(format!("Reading lump {}, `{}` failed", index, name))
    }
}

/// Attaches an `ErrorKind` to the failure of a `Result`, keeping the failure as the cause.
pub(crate) trait ResultExt<T> {
    fn chain_err<F>(self, kind: F) -> Result<T>
    where
        F: FnOnce() -> ErrorKind;
}

impl<T, E: Fail> ResultExt<T> for StdResult<T, E> {
    fn chain_err<F>(self, kind: F) -> Result<T>
    where
        F: FnOnce() -> ErrorKind,
    {
        self.map_err(|error| Error::from(error.context(kind())))
    }
}

/// Returns early with `$error` converted into an `Error` unless `$condition` holds.
macro_rules! ensure {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($crate::errors::Error::from($error));
        }
    };
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }

    pub(crate) fn bad_wad_header(error: bincode::Error) -> Self {
        Self::from_bincode(error, "Could not read WAD header.".to_owned())
    }

    pub(crate) fn bad_lump_info(lump_index: u32) -> impl FnOnce(bincode::Error) -> Self {
        move |error| Self::from_bincode(error, format!("Invalid lump info for lump {}", lump_index))
    }

    pub(crate) fn bad_lump_element<'a>(
        lump_index: usize,
        lump_name: &'a str,
        element_index: usize,
    ) -> impl FnOnce(bincode::Error) -> Self + 'a {
        move |error| {
            Self::from_bincode(
                error,
                format!(
                    "Invalid element {} in lump `{}` (index={})",
                    element_index, lump_name, lump_index
                ),
            )
        }
    }

    pub(crate) fn encoding_record(error: bincode::Error) -> Self {
        Self::from_bincode(error, "Could not encode record.".to_owned())
    }

    pub(crate) fn missing_required_lump<NameT: fmt::Debug>(name: &NameT) -> Self {
        Self::from(ErrorKind::CorruptWad(format!(
            "Missing required lump {:?}",
            name
        )))
    }

    pub(crate) fn missing_level(name: &str) -> Self {
        Self::from(ErrorKind::MissingLevel(name.to_owned()))
    }

    pub(crate) fn unexpected_level_lump(level: &str, expected: &str, found: &str) -> Self {
        Self::from(ErrorKind::CorruptWad(format!(
            "Level `{}` expected lump `{}`, found `{}`",
            level, expected, found
        )))
    }

    pub(crate) fn bad_reference(
        level: &str,
        what: &str,
        index: usize,
        reference: usize,
        len: usize,
    ) -> Self {
        Self::from(ErrorKind::CorruptWad(format!(
            "Level `{}`: {} {} references index {}, but there are only {}",
            level, what, index, reference, len
        )))
    }

    fn from_bincode(error: bincode::Error, message: String) -> Self {
        // Short reads are I/O failures, everything else is a malformed record.
        let kind = match *error {
            bincode::ErrorKind::Io(_) => ErrorKind::Io(message),
            _ => ErrorKind::CorruptWad(message),
        };
        Self::from(error.context(kind))
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Self {
        Error { inner }
    }
}
