//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// Existing legacy data files are opened read-only with
/// [`FileBackend::open_existing`]; exports go through
/// [`FileBackend::create`], which truncates any previous content.
///
/// # Example
///
/// ```no_run
/// use isamdb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open_existing(Path::new("ACCOUNTS.DAT")).unwrap();
/// let image = backend.read_all().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
}

impl FileBackend {
    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the file does not exist, or an
    /// I/O error if it cannot be opened.
    pub fn open_existing(path: &Path) -> StorageResult<Self> {
        let file = match OpenOptions::new().read(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_file(path, file)
    }

    /// Creates a new file, truncating any existing content.
    ///
    /// Parent directories are created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn create(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: File) -> StorageResult<Self> {
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if data.is_empty() {
            return Ok(*self.size.read());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;
        *size += data.len() as u64;

        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MISSING.DAT");

        let result = FileBackend::open_existing(&path);
        assert!(matches!(result, Err(StorageError::NotFound(p)) if p == path));
        assert!(!path.exists());
    }

    #[test]
    fn create_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OUT.DAT");

        let mut backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.append(b"hello").unwrap(), 0);
        assert_eq!(backend.append(b" world").unwrap(), 5);
        backend.flush().unwrap();

        let reopened = FileBackend::open_existing(&path).unwrap();
        assert_eq!(reopened.size().unwrap(), 11);
        assert_eq!(reopened.read_all().unwrap(), b"hello world");
        assert_eq!(reopened.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn create_truncates_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OUT.DAT");
        std::fs::write(&path, b"stale bytes").unwrap();

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
    }

    #[test]
    fn create_makes_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("DATA.DAT");

        let backend = FileBackend::create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SHORT.DAT");
        std::fs::write(&path, b"abc").unwrap();

        let backend = FileBackend::open_existing(&path).unwrap();
        let result = backend.read_at(2, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn empty_file_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EMPTY.DAT");
        std::fs::write(&path, b"").unwrap();

        let backend = FileBackend::open_existing(&path).unwrap();
        assert!(backend.read_all().unwrap().is_empty());
    }
}
