use super::errors::{Error, ErrorKind, Result, ResultExt};
use super::name::IntoWadName;
use super::types::{WadInfo, WadLump, WadName, WadRecord};
use indexmap::IndexMap;
use log::{info, warn};
use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt::Debug;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, Read, Seek, SeekFrom, Take};
use std::path::Path;
use std::vec::Vec;

/// A WAD archive: the header and lump directory, plus a reader positioned on demand.
///
/// Lumps are read lazily, by seeking to their offset for every read, so an `Archive` owns a
/// single cursor and cannot be shared between threads.
#[derive(Debug)]
pub struct Archive<R = BufReader<File>> {
    file: RefCell<R>,
    identifier: [u8; 4],
    index_map: IndexMap<WadName, usize>,
    lumps: Vec<LumpInfo>,
    levels: Vec<usize>,
}

impl Archive {
    pub fn open<W>(wad_path: &W) -> Result<Archive>
    where
        W: AsRef<Path> + Debug,
    {
        info!("Loading wad file '{:?}'...", wad_path);
        let file = File::open(wad_path.as_ref()).chain_err(ErrorKind::on_file_open)?;
        Archive::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    pub fn from_reader(mut file: R) -> Result<Archive<R>> {
        let file_len = file
            .seek(SeekFrom::End(0))
            .chain_err(ErrorKind::seeking_to_header)?;
        file.seek(SeekFrom::Start(0))
            .chain_err(ErrorKind::seeking_to_header)?;
        let header: WadInfo = bincode::deserialize_from(&mut file).map_err(Error::bad_wad_header)?;

        ensure!(
            VALID_HEADERS.contains(&&header.identifier[..]),
            ErrorKind::bad_wad_header_identifier(&header.identifier)
        );

        // Read lump info, reserving no more entries than fit between the table and end of file.
        let table_len = file_len.saturating_sub(u64::from(header.info_table_offset));
        let num_fitting = table_len / WadLump::SIZE as u64;
        let mut lumps = Vec::with_capacity(u64::from(header.num_lumps).min(num_fitting) as usize);
        let mut levels = Vec::with_capacity(64);
        let mut index_map = IndexMap::new();

        file.seek(SeekFrom::Start(u64::from(header.info_table_offset)))
            .chain_err(|| ErrorKind::seeking_to_info_table_offset(header.info_table_offset))?;
        for i_lump in 0..header.num_lumps {
            let fileinfo: WadLump =
                bincode::deserialize_from(&mut file).map_err(Error::bad_lump_info(i_lump))?;

            // Later entries shadow earlier ones with the same name.
            index_map.insert(fileinfo.name, lumps.len());
            lumps.push(LumpInfo {
                name: fileinfo.name,
                offset: u64::from(fileinfo.file_pos),
                size: fileinfo.size as usize,
            });

            // Our heuristic for level lumps is that they are preceeded by the "THINGS"
            // lump.
            if &fileinfo.name == b"THINGS\0\0" && i_lump > 0 {
                levels.push((i_lump - 1) as usize);
            }
        }
        info!(
            "Read {} lumps, {} levels from {} archive.",
            lumps.len(),
            levels.len(),
            String::from_utf8_lossy(&header.identifier)
        );

        Ok(Archive {
            file: RefCell::new(file),
            identifier: header.identifier,
            index_map,
            lumps,
            levels,
        })
    }

    pub fn identifier(&self) -> &[u8; 4] {
        &self.identifier
    }

    pub fn num_lumps(&self) -> usize {
        self.lumps.len()
    }

    pub fn lumps(&self) -> impl Iterator<Item = LumpReader<'_, R>> + '_ {
        (0..self.lumps.len()).map(move |index| LumpReader {
            archive: self,
            info: &self.lumps[index],
            index,
        })
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level_lump(&self, level_index: usize) -> Result<LumpReader<R>> {
        let index = *self
            .levels
            .get(level_index)
            .ok_or_else(|| Error::missing_required_lump(&level_index))?;
        self.lump_by_index(index)
    }

    pub fn level_names(&self) -> impl Iterator<Item = WadName> + '_ {
        self.levels.iter().map(move |&index| self.lumps[index].name)
    }

    /// Directory index of the last lump called `name`.
    pub fn lump_index<Q>(&self, name: &Q) -> Option<usize>
    where
        WadName: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_map.get(name).cloned()
    }

    pub fn required_named_lump<'a, Q>(&self, name: &'a Q) -> Result<LumpReader<R>>
    where
        &'a Q: IntoWadName,
        Q: ?Sized,
    {
        let name: WadName = name.into_wad_name()?;
        self.named_lump(&name)?
            .ok_or_else(|| Error::missing_required_lump(&name))
    }

    pub fn named_lump<Q>(&self, name: &Q) -> Result<Option<LumpReader<R>>>
    where
        WadName: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.lump_index(name) {
            Some(index) => self.lump_by_index(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn lump_by_index(&self, index: usize) -> Result<LumpReader<R>> {
        Ok(LumpReader {
            archive: self,
            info: self
                .lumps
                .get(index)
                .ok_or_else(|| Error::missing_required_lump(&index))?,
            index,
        })
    }

    pub fn decode_records<T: WadRecord>(&self, index: usize) -> Result<Vec<T>> {
        self.lump_by_index(index)?.decode_vec()
    }
}

#[derive(Debug)]
pub struct LumpReader<'a, R = BufReader<File>> {
    archive: &'a Archive<R>,
    info: &'a LumpInfo,
    index: usize,
}

impl<'a, R> Clone for LumpReader<'a, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R> Copy for LumpReader<'a, R> {}

impl<'a, R: Read + Seek> LumpReader<'a, R> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> WadName {
        self.info.name
    }

    pub fn offset(&self) -> u64 {
        self.info.offset
    }

    pub fn size(&self) -> usize {
        self.info.size
    }

    pub fn is_virtual(&self) -> bool {
        self.info.size == 0
    }

    pub fn decode_vec<T: WadRecord>(&self) -> Result<Vec<T>> {
        let LumpReader { info, index, .. } = *self;
        let element_size = T::SIZE;
        let num_elements = info.size / element_size;
        if info.size % element_size != 0 {
            warn!(
                "Lump `{}` (index={}) size {} is not a multiple of {}, ignoring {} trailing bytes.",
                info.name,
                index,
                info.size,
                element_size,
                info.size % element_size
            );
        }

        self.read(|mut file| {
            (0..num_elements)
                .map(move |i_element| {
                    bincode::deserialize_from(&mut file).map_err(Error::bad_lump_element(
                        index,
                        info.name.as_str(),
                        i_element,
                    ))
                })
                .collect()
        })
    }

    pub fn read_bytes_into(&self, bytes: &mut Vec<u8>) -> Result<()> {
        let LumpReader { info, index, .. } = *self;
        self.read(|file| {
            let old_size = bytes.len();
            bytes.resize(old_size + info.size, 0u8);
            file.read_exact(&mut bytes[old_size..])
                .chain_err(|| ErrorKind::reading_lump(index, info.name.as_str()))?;
            Ok(())
        })
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.read_bytes_into(&mut bytes).map(|_| bytes)
    }

    fn read<F, T>(&self, with: F) -> Result<T>
    where
        F: FnOnce(&mut Take<&mut R>) -> Result<T>,
    {
        let LumpReader {
            info,
            index,
            archive,
        } = *self;
        let mut file = archive.file.borrow_mut();
        file.seek(SeekFrom::Start(info.offset))
            .chain_err(|| ErrorKind::seeking_to_lump(index, info.name.as_str()))?;
        with(&mut Read::take(&mut *file, info.size as u64))
    }
}

/// Encodes `record` exactly as it is laid out in a lump.
pub fn encode_record<T: WadRecord>(record: &T) -> Result<Vec<u8>> {
    bincode::serialize(record).map_err(Error::encoding_record)
}

#[derive(Copy, Clone, Debug)]
struct LumpInfo {
    name: WadName,
    offset: u64,
    size: usize,
}

const VALID_HEADERS: &[&[u8]] = &[b"IWAD", b"PWAD"];

#[cfg(test)]
mod test {
    use super::super::errors::ErrorKind;
    use super::super::fixture::WadBuilder;
    use super::super::types::WadVertex;
    use super::Archive;
    use std::io::{Cursor, Write};

    fn two_level_wad() -> Vec<u8> {
        WadBuilder::new()
            .lump("PLAYPAL", vec![1, 2, 3])
            .lump("E1M1", Vec::new())
            .lump("THINGS", Vec::new())
            .lump("E1M2", Vec::new())
            .lump("THINGS", vec![0u8; 10])
            .build()
    }

    #[test]
    fn directory_lookup_is_last_write_wins() {
        let wad = Archive::from_reader(Cursor::new(two_level_wad())).unwrap();
        assert_eq!(wad.identifier(), b"IWAD");
        assert_eq!(wad.num_lumps(), 5);

        let things = wad.lump_index(b"THINGS\0\0").unwrap();
        assert_eq!(things, 4);
        assert_eq!(wad.lump_by_index(things).unwrap().size(), 10);
        assert_eq!(wad.lump_index(b"E1M1\0\0\0\0"), Some(1));
        assert_eq!(wad.lump_index(b"E1M3\0\0\0\0"), None);

        for lump in wad.lumps() {
            assert_eq!(wad.lump_index(&*lump.name()).map(|i| i >= lump.index()), Some(true));
        }
    }

    #[test]
    fn levels_are_markers_before_things() {
        let wad = Archive::from_reader(Cursor::new(two_level_wad())).unwrap();
        assert_eq!(wad.num_levels(), 2);
        let names: Vec<String> = wad.level_names().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["E1M1", "E1M2"]);
        assert!(wad.level_lump(0).unwrap().is_virtual());
        assert!(wad.level_lump(2).is_err());
    }

    #[test]
    fn named_lumps_read_raw_bytes() {
        let wad = Archive::from_reader(Cursor::new(two_level_wad())).unwrap();
        let playpal = wad.required_named_lump("playpal").unwrap();
        assert_eq!(playpal.read_bytes().unwrap(), vec![1, 2, 3]);
        assert!(wad.named_lump(b"COLORMAP").unwrap().is_none());
        assert_eq!(
            wad.required_named_lump("COLORMAP").unwrap_err().kind(),
            &ErrorKind::CorruptWad("Missing required lump WadName(\"COLORMAP\")".to_owned())
        );
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let bytes = WadBuilder::new()
            .lump("VERTEXES", vec![1, 0, 2, 0, 0xff, 0xff, 4, 0, 9])
            .build();
        let wad = Archive::from_reader(Cursor::new(bytes)).unwrap();
        let vertices: Vec<WadVertex> = wad.decode_records(0).unwrap();
        assert_eq!(
            vertices,
            vec![WadVertex { x: 1, y: 2 }, WadVertex { x: -1, y: 4 }]
        );
    }

    #[test]
    fn bad_identifier_is_corrupt() {
        let mut bytes = two_level_wad();
        bytes[..4].copy_from_slice(b"ZWAD");
        match Archive::from_reader(Cursor::new(bytes)).unwrap_err().kind() {
            ErrorKind::CorruptWad(_) => {}
            kind => panic!("unexpected error {:?}", kind),
        }
    }

    #[test]
    fn truncated_directory_is_io_error() {
        let mut bytes = two_level_wad();
        let len = bytes.len();
        bytes.truncate(len - 8);
        match Archive::from_reader(Cursor::new(bytes)).unwrap_err().kind() {
            ErrorKind::Io(_) => {}
            kind => panic!("unexpected error {:?}", kind),
        }
    }

    #[test]
    fn oversized_directory_count_is_io_error() {
        let mut bytes = b"IWAD".to_vec();
        bytes.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
        bytes.extend_from_slice(&12u32.to_le_bytes());
        match Archive::from_reader(Cursor::new(bytes)).unwrap_err().kind() {
            ErrorKind::Io(_) => {}
            kind => panic!("unexpected error {:?}", kind),
        }

        let mut bytes = two_level_wad();
        bytes[4..8].copy_from_slice(&0x0100_0000u32.to_le_bytes());
        match Archive::from_reader(Cursor::new(bytes)).unwrap_err().kind() {
            ErrorKind::Io(_) => {}
            kind => panic!("unexpected error {:?}", kind),
        }
    }

    #[test]
    fn lump_readers_are_debug() {
        let wad = Archive::from_reader(Cursor::new(two_level_wad())).unwrap();
        let playpal = wad.required_named_lump("PLAYPAL").unwrap();
        let printed = format!("{:?}", playpal);
        assert!(printed.contains("PLAYPAL"), "{}", printed);
        assert!(printed.contains("index: 0"), "{}", printed);
    }

    #[test]
    fn open_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&WadBuilder::pwad().lump("E1M1", Vec::new()).build())
            .unwrap();
        let wad = Archive::open(&file.path()).unwrap();
        assert_eq!(wad.identifier(), b"PWAD");

        match Archive::open(&"/nonexistent/doom.wad").unwrap_err().kind() {
            ErrorKind::Io(_) => {}
            kind => panic!("unexpected error {:?}", kind),
        }
    }
}
