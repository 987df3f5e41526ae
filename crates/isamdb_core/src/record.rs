//! Fixed-length record storage.

use crate::error::{CoreError, CoreResult};
use crate::key::KeyDescriptor;

/// Largest record count the 16-bit header field can express.
pub const MAX_RECORDS: usize = u16::MAX as usize;

/// Ordered sequence of fixed-length records.
///
/// Records live in a plain vector: inserts shift later records up and
/// searches scan from the start. Legacy callers only ever hold a handful of
/// records per file, so there is no page or index structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    record_length: usize,
    records: Vec<Vec<u8>>,
}

impl RecordStore {
    /// Creates an empty store for records of `record_length` bytes.
    #[must_use]
    pub fn new(record_length: usize) -> Self {
        Self {
            record_length,
            records: Vec::new(),
        }
    }

    /// Loads `count` records laid out back to back from `data_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] if the image ends before the last record.
    pub fn load(
        image: &[u8],
        data_offset: usize,
        record_length: usize,
        count: usize,
    ) -> CoreResult<Self> {
        let end = record_length
            .checked_mul(count)
            .and_then(|len| len.checked_add(data_offset))
            .ok_or_else(|| CoreError::format("record area size overflows"))?;

        if count > 0 && end > image.len() {
            return Err(CoreError::format(format!(
                "{count} records of {record_length} bytes need {end} bytes, file has {}",
                image.len()
            )));
        }

        let records = (0..count)
            .map(|i| {
                let start = data_offset + i * record_length;
                image[start..start + record_length].to_vec()
            })
            .collect();

        Ok(Self {
            record_length,
            records,
        })
    }

    /// Returns the fixed record length.
    #[must_use]
    pub const fn record_length(&self) -> usize {
        self.record_length
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> CoreResult<&[u8]> {
        self.records
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::index_out_of_range(index, self.records.len()))
    }

    /// Inserts `data` at `index`, shifting later records up.
    ///
    /// `index == len()` appends.
    ///
    /// # Errors
    ///
    /// - [`CoreError::LengthMismatch`] if `data` is not `record_length` bytes
    /// - [`CoreError::IndexOutOfRange`] if `index > len()`
    /// - [`CoreError::StoreFull`] if the record count would overflow 16 bits
    ///
    /// Nothing is modified when an error is returned.
    pub fn insert(&mut self, index: usize, data: Vec<u8>) -> CoreResult<()> {
        self.check_length(&data)?;
        if index > self.records.len() {
            return Err(CoreError::index_out_of_range(index, self.records.len()));
        }
        if self.records.len() >= MAX_RECORDS {
            return Err(CoreError::StoreFull { max: MAX_RECORDS });
        }

        self.records.insert(index, data);
        Ok(())
    }

    /// Overwrites the record at `index`.
    ///
    /// On an empty store, updating index 0 creates the first record.
    ///
    /// # Errors
    ///
    /// - [`CoreError::LengthMismatch`] if `data` is not `record_length` bytes
    /// - [`CoreError::IndexOutOfRange`] if there is no record at `index`
    pub fn update(&mut self, index: usize, data: Vec<u8>) -> CoreResult<()> {
        self.check_length(&data)?;

        if self.records.is_empty() && index == 0 {
            self.records.push(data);
            return Ok(());
        }

        let count = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or_else(|| CoreError::index_out_of_range(index, count))?;
        *slot = data;
        Ok(())
    }

    /// Returns the index of the first record starting with `key`.
    #[must_use]
    pub fn find_prefix(&self, key: &[u8]) -> Option<usize> {
        self.records.iter().position(|record| record.starts_with(key))
    }

    /// Returns the index of the first record holding `key` in the field
    /// described by `descriptor`.
    #[must_use]
    pub fn find_keyed(&self, descriptor: &KeyDescriptor, key: &[u8]) -> Option<usize> {
        self.records
            .iter()
            .position(|record| descriptor.matches(record, key))
    }

    /// Iterates over records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.records.iter().map(Vec::as_slice)
    }

    fn check_length(&self, data: &[u8]) -> CoreResult<()> {
        if data.len() != self.record_length {
            return Err(CoreError::length_mismatch(self.record_length, data.len()));
        }
        Ok(())
    }
}
