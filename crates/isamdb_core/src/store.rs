//! One open legacy data file.

use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::{CoreError, CoreResult};
use crate::header::{BufferedHeader, FileHeader, HeaderField, MIN_HEADER_SIZE};
use crate::key::{KeyDescriptor, KeySet};
use crate::record::{RecordStore, MAX_RECORDS};
use crate::types::Status;
use isamdb_storage::{FileBackend, StorageBackend, StorageError};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Header, records, keys and cursor of one open file.
///
/// The record length used to validate record buffers is always the one the
/// caller declared at open time. The header's own record length field is
/// reported as read but never trusted.
///
/// Mutations stay in memory. [`Store::to_image`] renders the current state
/// when an explicit export is wanted.
#[derive(Debug, Clone)]
pub struct Store {
    name: String,
    record_length: u16,
    data_offset: usize,
    header: FileHeader,
    records: RecordStore,
    keys: KeySet,
    cursor: Cursor,
}

impl Store {
    /// Opens `file_name` under `base_path` (or the configured base path).
    ///
    /// A missing file yields an empty store with the declared record length,
    /// unless [`Config::create_if_missing`] is off.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Format`] if the file is too short for a header or its
    ///   record area
    /// - [`CoreError::StoreNotFound`] if the file is missing and auto-creation
    ///   is disabled
    /// - [`CoreError::Storage`] on read failures
    pub fn open(
        file_name: &str,
        base_path: Option<&Path>,
        record_length: u16,
        config: &Config,
    ) -> CoreResult<Self> {
        let path = config.resolve(file_name, base_path);

        match FileBackend::open_existing(&path) {
            Ok(backend) => Self::from_backend(file_name, &backend, record_length, config),
            Err(StorageError::NotFound(_)) if config.create_if_missing => {
                warn!(
                    file = file_name,
                    path = %path.display(),
                    "file not found, synthesizing an empty store"
                );
                Self::synthesize(file_name, record_length, config)
            }
            Err(StorageError::NotFound(_)) => Err(CoreError::StoreNotFound {
                name: file_name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads a store from the full content of `backend`.
    ///
    /// # Errors
    ///
    /// Same as [`Store::from_image`], plus backend read failures.
    pub fn from_backend(
        file_name: &str,
        backend: &dyn StorageBackend,
        record_length: u16,
        config: &Config,
    ) -> CoreResult<Self> {
        let image = backend.read_all()?;
        Self::from_image(file_name, image, record_length, config)
    }

    /// Parses a file image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] if the image is shorter than the header,
    /// ends inside the record area, or if the configured record area overlaps
    /// the header.
    pub fn from_image(
        file_name: &str,
        image: Vec<u8>,
        record_length: u16,
        config: &Config,
    ) -> CoreResult<Self> {
        let data_offset = record_area_offset(config)?;
        debug!(file = file_name, bytes = image.len(), "parsing header");

        let buffered = BufferedHeader::parse(image)?;
        let count = usize::from(buffered.get(HeaderField::RecordCount));
        let records = RecordStore::load(
            buffered.image(),
            data_offset,
            usize::from(record_length),
            count,
        )?;
        let header = FileHeader::Buffered(buffered);

        debug!(
            file = file_name,
            record_length,
            header_record_length = header.record_length(),
            record_count = count,
            page_count = ?header.page_count(),
            key_count = header.key_count(),
            "loaded store"
        );

        Ok(Self {
            name: file_name.to_string(),
            record_length,
            data_offset,
            header,
            records,
            keys: KeySet::new(),
            cursor: Cursor::new(),
        })
    }

    /// Creates an empty store with no file image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] if the configured record area overlaps
    /// the header.
    pub fn synthesize(file_name: &str, record_length: u16, config: &Config) -> CoreResult<Self> {
        Ok(Self {
            name: file_name.to_string(),
            record_length,
            data_offset: record_area_offset(config)?,
            header: FileHeader::detached(record_length),
            records: RecordStore::new(usize::from(record_length)),
            keys: KeySet::new(),
            cursor: Cursor::new(),
        })
    }

    /// Returns the file name the store was opened with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared record length.
    #[must_use]
    pub const fn record_length(&self) -> u16 {
        self.record_length
    }

    /// Returns the number of records.
    #[must_use]
    pub fn record_count(&self) -> u16 {
        self.header.record_count()
    }

    /// Returns the physical record length from the header.
    #[must_use]
    pub fn physical_record_length(&self) -> u16 {
        self.header.physical_record_length()
    }

    /// Returns the page length from the header.
    #[must_use]
    pub fn page_length(&self) -> u16 {
        self.header.page_length()
    }

    /// Returns the key count from the header.
    #[must_use]
    pub fn key_count(&self) -> u16 {
        self.header.key_count()
    }

    /// Returns the page count; `None` without a file image.
    #[must_use]
    pub fn page_count(&self) -> Option<u32> {
        self.header.page_count()
    }

    /// Returns the header.
    #[must_use]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns the defined keys.
    #[must_use]
    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Iterates over records in storage order.
    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        self.records.iter()
    }

    /// Returns the cursor position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] if `index >= record_count()`.
    pub fn get_record(&self, index: usize) -> CoreResult<&[u8]> {
        self.records.get(index)
    }

    /// Returns the record under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] if the cursor is past the end.
    pub fn current_record(&self) -> CoreResult<&[u8]> {
        self.records.get(self.cursor.position())
    }

    /// Inserts `data` at `index`.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::insert`]; nothing changes on error.
    pub fn insert(&mut self, index: usize, data: Vec<u8>) -> CoreResult<()> {
        self.records.insert(index, data)?;
        self.sync_record_count();
        trace!(file = %self.name, index, count = self.records.len(), "inserted record");
        Ok(())
    }

    /// Inserts `data` at the cursor position.
    ///
    /// # Errors
    ///
    /// See [`Store::insert`].
    pub fn insert_current(&mut self, data: Vec<u8>) -> CoreResult<()> {
        self.insert(self.cursor.position(), data)
    }

    /// Overwrites the record at `index`.
    ///
    /// On an empty store, updating index 0 creates the first record and sets
    /// the record count to 1.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::update`]; nothing changes on error.
    pub fn update(&mut self, index: usize, data: Vec<u8>) -> CoreResult<()> {
        self.records.update(index, data)?;
        self.sync_record_count();
        trace!(file = %self.name, index, "updated record");
        Ok(())
    }

    /// Overwrites the record at the cursor position.
    ///
    /// # Errors
    ///
    /// See [`Store::update`].
    pub fn update_current(&mut self, data: Vec<u8>) -> CoreResult<()> {
        self.update(self.cursor.position(), data)
    }

    /// Moves the cursor to record 0.
    pub fn step_first(&mut self) -> Status {
        self.cursor.step_first(self.records.len())
    }

    /// Advances the cursor by one record, unchecked.
    pub fn step_next(&mut self) -> Status {
        self.cursor.step_next()
    }

    /// Positions the cursor on the first record starting with `key`.
    ///
    /// The cursor does not move when nothing matches.
    pub fn get_record_by_key(&mut self, key: &[u8]) -> Status {
        let found = self.records.find_prefix(key);
        self.position_on(found)
    }

    /// Positions the cursor on the first record whose `key_number` field
    /// holds `key`.
    ///
    /// Falls back to [`Store::get_record_by_key`] when the key number has no
    /// descriptor.
    pub fn get_equal(&mut self, key_number: u16, key: &[u8]) -> Status {
        let found = match self.keys.get(key_number) {
            Some(descriptor) => self.records.find_keyed(descriptor, key),
            None => {
                trace!(file = %self.name, key_number, "no descriptor, matching leading bytes");
                self.records.find_prefix(key)
            }
        };
        self.position_on(found)
    }

    /// Registers a key descriptor.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidKeyDescriptor`] if the descriptor is too short
    /// - [`CoreError::DuplicateKey`] if `number` is already defined
    pub fn define_key(&mut self, number: u16, length: u16, descriptor: Vec<u8>) -> CoreResult<()> {
        self.keys
            .insert(KeyDescriptor::new(number, length, descriptor)?)?;

        if self.keys.len() > usize::from(self.header.key_count()) {
            warn!(
                file = %self.name,
                defined = self.keys.len(),
                declared = self.header.key_count(),
                "more keys defined than the header declares"
            );
        }
        Ok(())
    }

    /// Renders the header and records into a file image.
    ///
    /// A loaded store keeps every byte of its original image outside the
    /// record area; a synthesized store gets a zeroed header with its field
    /// values written in.
    #[must_use]
    pub fn to_image(&self) -> Vec<u8> {
        let record_length = usize::from(self.record_length);
        let records_end = self.data_offset + record_length * self.records.len();

        let mut image = match &self.header {
            FileHeader::Buffered(header) => header.image().to_vec(),
            FileHeader::Detached(fields) => {
                let mut image = vec![0u8; self.data_offset];
                fields.write_to(&mut image);
                image
            }
        };
        if image.len() < records_end {
            image.resize(records_end, 0);
        }

        for (i, record) in self.records.iter().enumerate() {
            let start = self.data_offset + i * record_length;
            image[start..start + record_length].copy_from_slice(record);
        }
        image
    }

    fn position_on(&mut self, found: Option<usize>) -> Status {
        match found {
            Some(index) => {
                self.cursor.seek(index);
                Status::Found
            }
            None => Status::NotFound,
        }
    }

    fn sync_record_count(&mut self) {
        // RecordStore::insert caps the length at MAX_RECORDS == u16::MAX
        debug_assert!(self.records.len() <= MAX_RECORDS);
        self.header.set(HeaderField::RecordCount, self.records.len() as u16);
    }
}

/// Returns the configured record area offset, rejecting one that would let
/// records overwrite header fields.
fn record_area_offset(config: &Config) -> CoreResult<usize> {
    let offset = config.record_data_offset;
    if offset < MIN_HEADER_SIZE {
        return Err(CoreError::format(format!(
            "record area at {offset:#x} overlaps the header, which needs {MIN_HEADER_SIZE:#x} bytes"
        )));
    }
    Ok(offset)
}
