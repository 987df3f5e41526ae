//! Test fixtures and data file helpers.
//!
//! Provides a builder for legacy data file images and a temporary data
//! directory bound to an engine session.

use isamdb_core::header::{HeaderField, HeaderFields, RECORD_DATA_OFFSET};
use isamdb_core::{Config, CurrentStore, Engine, StoreHandle};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a legacy data file image.
///
/// Header fields default to a consistent file: the record length and
/// physical record length match the declared length, and the record count
/// follows the records added.
#[derive(Debug, Clone)]
pub struct LegacyImage {
    fields: HeaderFields,
    record_count: Option<u16>,
    records: Vec<Vec<u8>>,
    data_offset: usize,
    trailing: usize,
}

impl LegacyImage {
    /// Starts an image for records of `record_length` bytes.
    pub fn new(record_length: u16) -> Self {
        let mut fields = HeaderFields::default();
        fields.set(HeaderField::PageLength, 512);
        fields.set(HeaderField::RecordLength, record_length);
        fields.set(HeaderField::PhysicalRecordLength, record_length);

        Self {
            fields,
            record_count: None,
            records: Vec::new(),
            data_offset: RECORD_DATA_OFFSET,
            trailing: 0,
        }
    }

    /// Sets a raw header field.
    pub fn field(mut self, field: HeaderField, value: u16) -> Self {
        self.fields.set(field, value);
        self
    }

    /// Sets the page length.
    pub fn page_length(self, value: u16) -> Self {
        self.field(HeaderField::PageLength, value)
    }

    /// Sets the key count.
    pub fn key_count(self, value: u16) -> Self {
        self.field(HeaderField::KeyCount, value)
    }

    /// Overrides the stored record count instead of deriving it.
    pub fn record_count(mut self, value: u16) -> Self {
        self.record_count = Some(value);
        self
    }

    /// Moves the record area.
    pub fn data_offset(mut self, offset: usize) -> Self {
        self.data_offset = offset;
        self
    }

    /// Appends `len` zero bytes after the last record.
    pub fn trailing(mut self, len: usize) -> Self {
        self.trailing = len;
        self
    }

    /// Appends a record.
    pub fn record(mut self, data: &[u8]) -> Self {
        self.records.push(data.to_vec());
        self
    }

    /// Appends several records.
    pub fn records<I, R>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        self.records
            .extend(records.into_iter().map(|r| r.as_ref().to_vec()));
        self
    }

    /// Renders the image.
    pub fn build(&self) -> Vec<u8> {
        let mut fields = self.fields;
        let count = self
            .record_count
            .unwrap_or_else(|| u16::try_from(self.records.len()).expect("too many records"));
        fields.set(HeaderField::RecordCount, count);

        let mut image = vec![0u8; self.data_offset];
        fields.write_to(&mut image);
        for record in &self.records {
            image.extend_from_slice(record);
        }
        image.resize(image.len() + self.trailing, 0);
        image
    }
}

/// A temporary data directory with an engine session.
pub struct TestEngine {
    /// The engine instance.
    pub engine: Engine,
    /// The session's current-store context.
    pub ctx: CurrentStore,
    temp_dir: TempDir,
}

impl TestEngine {
    /// Creates an engine rooted at a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an engine with `config`, rooted at a fresh temporary directory.
    ///
    /// The configured base path is replaced with the temporary directory.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config.base_path(temp_dir.path());

        Self {
            engine: Engine::new(config),
            ctx: CurrentStore::new(),
            temp_dir,
        }
    }

    /// Returns the data directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the full path of `file_name` in the data directory.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.temp_dir.path().join(file_name)
    }

    /// Writes a data file into the directory.
    pub fn write_file(&self, file_name: &str, image: &[u8]) -> PathBuf {
        let path = self.path(file_name);
        std::fs::write(&path, image).expect("Failed to write data file");
        path
    }

    /// Opens `file_name`, making it current.
    pub fn open(&mut self, file_name: &str, record_length: u16) -> StoreHandle {
        self.engine
            .open(&mut self.ctx, file_name, None, record_length)
            .expect("Failed to open store")
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestEngine {
    type Target = Engine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

impl std::ops::DerefMut for TestEngine {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.engine
    }
}

/// Runs a test with an engine rooted at a temporary directory.
///
/// # Example
///
/// ```rust,ignore
/// use isamdb_testkit::with_temp_engine;
///
/// #[test]
/// fn my_test() {
///     with_temp_engine(|env| {
///         let handle = env.open("MISSING.DAT", 64);
///         // ... test operations
///     });
/// }
/// ```
pub fn with_temp_engine<F, R>(f: F) -> R
where
    F: FnOnce(&mut TestEngine) -> R,
{
    let mut env = TestEngine::new();
    f(&mut env)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Builds a file of `count` records, each filled with one letter
    /// starting at `A`.
    pub fn lettered_image(record_length: u16, count: usize) -> Vec<u8> {
        let records = (0..count).map(|i| {
            let letter = b'A' + (i % 26) as u8;
            vec![letter; usize::from(record_length)]
        });
        LegacyImage::new(record_length).records(records).build()
    }

    /// Creates an engine with a lettered file already open and current.
    pub fn opened_store(
        file_name: &str,
        record_length: u16,
        count: usize,
    ) -> (TestEngine, StoreHandle) {
        let mut env = TestEngine::new();
        env.write_file(file_name, &lettered_image(record_length, count));
        let handle = env.open(file_name, record_length);
        (env, handle)
    }
}
