//! CLI command implementations.

pub mod dump;
pub mod export;
pub mod find;
pub mod inspect;

use isamdb_core::{Config, FileHeader, Store};
use isamdb_storage::{FileBackend, StorageBackend};
use std::path::Path;

/// Loads the data file at `path` as a store.
///
/// Without an explicit `record_length` the header's own record length field
/// is used. Unlike the engine, a missing file is an error here.
pub fn load_store(
    path: &Path,
    record_length: Option<u16>,
) -> Result<Store, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No data file found at {:?}", path).into());
    }

    let backend = FileBackend::open_existing(path)?;
    let image = backend.read_all()?;

    let record_length = match record_length {
        Some(len) => len,
        None => FileHeader::parse(image.clone())?.record_length(),
    };
    if record_length == 0 {
        return Err("Record length is zero; pass --record-length".into());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Store::from_image(&name, image, record_length, &Config::default())?)
}

/// Renders bytes as space-separated hex pairs.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders bytes as printable ASCII, with `.` for everything else.
pub fn ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use isamdb_core::header::{HeaderField, HeaderFields, RECORD_DATA_OFFSET};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, records: &[&[u8]]) -> PathBuf {
        let record_length = records[0].len();
        let mut fields = HeaderFields::default();
        fields.set(HeaderField::RecordLength, record_length as u16);
        fields.set(HeaderField::RecordCount, records.len() as u16);

        let mut image = vec![0u8; RECORD_DATA_OFFSET];
        fields.write_to(&mut image);
        for record in records {
            image.extend_from_slice(record);
        }

        let path = dir.path().join("TEST.DAT");
        std::fs::write(&path, image).unwrap();
        path
    }

    #[test]
    fn load_uses_header_record_length() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, &[b"AAAA", b"BBBB"]);

        let store = load_store(&path, None).unwrap();
        assert_eq!(store.name(), "TEST.DAT");
        assert_eq!(store.record_length(), 4);
        assert_eq!(store.record_count(), 2);
        assert_eq!(store.get_record(1).unwrap(), b"BBBB");
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load_store(&dir.path().join("NOPE.DAT"), Some(4)).is_err());
    }

    #[test]
    fn hex_and_ascii_rendering() {
        assert_eq!(hex(&[0x41, 0x00, 0xFF]), "41 00 FF");
        assert_eq!(ascii(&[0x41, 0x00, b' ', 0xFF]), "A. .");
    }
}
