//! Legacy file header.
//!
//! All header scalars are 16-bit little-endian values at fixed offsets:
//!
//! ```text
//! 0x08  page length
//! 0x14  key count
//! 0x16  record length
//! 0x18  physical record length
//! 0x1C  record count
//! 0x206 record 0, followed by record i at 0x206 + i * record length
//! ```
//!
//! A header loaded from an existing file is [`FileHeader::Buffered`]: every
//! read and write goes straight through the file image, so the image always
//! reflects the current field values. A store synthesized for a missing file
//! has no image and uses [`FileHeader::Detached`] plain values instead.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;

/// Offset of the page length field.
pub const PAGE_LENGTH_OFFSET: usize = 0x08;
/// Offset of the key count field.
pub const KEY_COUNT_OFFSET: usize = 0x14;
/// Offset of the record length field.
pub const RECORD_LENGTH_OFFSET: usize = 0x16;
/// Offset of the physical record length field.
pub const PHYSICAL_RECORD_LENGTH_OFFSET: usize = 0x18;
/// Offset of the record count field.
pub const RECORD_COUNT_OFFSET: usize = 0x1C;
/// Smallest image from which every header field can be read.
pub const MIN_HEADER_SIZE: usize = RECORD_COUNT_OFFSET + 2;
/// Offset of record 0 in the fixed record layout.
pub const RECORD_DATA_OFFSET: usize = 0x206;

/// A scalar header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// Page size in bytes.
    PageLength,
    /// Number of keys defined on the file.
    KeyCount,
    /// Logical record length as recorded in the file.
    RecordLength,
    /// Record length including per-record overhead.
    PhysicalRecordLength,
    /// Number of records.
    RecordCount,
}

impl HeaderField {
    /// All fields in offset order.
    pub const ALL: [Self; 5] = [
        Self::PageLength,
        Self::KeyCount,
        Self::RecordLength,
        Self::PhysicalRecordLength,
        Self::RecordCount,
    ];

    /// Returns the byte offset of the field.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::PageLength => PAGE_LENGTH_OFFSET,
            Self::KeyCount => KEY_COUNT_OFFSET,
            Self::RecordLength => RECORD_LENGTH_OFFSET,
            Self::PhysicalRecordLength => PHYSICAL_RECORD_LENGTH_OFFSET,
            Self::RecordCount => RECORD_COUNT_OFFSET,
        }
    }
}

/// Plain values of every header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HeaderFields {
    /// Page size in bytes.
    pub page_length: u16,
    /// Number of keys defined on the file.
    pub key_count: u16,
    /// Logical record length.
    pub record_length: u16,
    /// Record length including per-record overhead.
    pub physical_record_length: u16,
    /// Number of records.
    pub record_count: u16,
}

impl HeaderFields {
    /// Returns the value of `field`.
    #[must_use]
    pub const fn get(&self, field: HeaderField) -> u16 {
        match field {
            HeaderField::PageLength => self.page_length,
            HeaderField::KeyCount => self.key_count,
            HeaderField::RecordLength => self.record_length,
            HeaderField::PhysicalRecordLength => self.physical_record_length,
            HeaderField::RecordCount => self.record_count,
        }
    }

    /// Sets the value of `field`.
    pub fn set(&mut self, field: HeaderField, value: u16) {
        let slot = match field {
            HeaderField::PageLength => &mut self.page_length,
            HeaderField::KeyCount => &mut self.key_count,
            HeaderField::RecordLength => &mut self.record_length,
            HeaderField::PhysicalRecordLength => &mut self.physical_record_length,
            HeaderField::RecordCount => &mut self.record_count,
        };
        *slot = value;
    }

    /// Writes every field into `buf` at its fixed offset.
    ///
    /// `buf` must be at least [`MIN_HEADER_SIZE`] bytes long.
    pub fn write_to(&self, buf: &mut [u8]) {
        for field in HeaderField::ALL {
            write_u16(buf, field.offset(), self.get(field));
        }
    }
}

/// Header fields backed by the full file image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedHeader {
    image: Vec<u8>,
}

impl BufferedHeader {
    /// Wraps a file image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] if the image is too short to hold the
    /// record count field.
    pub fn parse(image: Vec<u8>) -> CoreResult<Self> {
        if image.len() < MIN_HEADER_SIZE {
            return Err(CoreError::format(format!(
                "file is {} bytes, header needs at least {MIN_HEADER_SIZE}",
                image.len()
            )));
        }
        Ok(Self { image })
    }

    /// Reads `field` from the image.
    #[must_use]
    pub fn get(&self, field: HeaderField) -> u16 {
        read_u16(&self.image, field.offset())
    }

    /// Writes `field` into the image.
    pub fn set(&mut self, field: HeaderField, value: u16) {
        write_u16(&mut self.image, field.offset(), value);
    }

    /// Returns the file image.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Returns `data length / page length - 1`.
    ///
    /// `None` when the page length is zero or larger than the image.
    #[must_use]
    pub fn page_count(&self) -> Option<u32> {
        let page_length = usize::from(self.get(HeaderField::PageLength));
        if page_length == 0 {
            return None;
        }
        (self.image.len() / page_length)
            .checked_sub(1)
            .and_then(|count| u32::try_from(count).ok())
    }
}

/// Header of an open store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileHeader {
    /// Fields live in the file image loaded at open time.
    Buffered(BufferedHeader),
    /// Fields of a synthesized store with no file image.
    Detached(HeaderFields),
}

impl FileHeader {
    /// Parses the header of an existing file image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] if the image is too short.
    pub fn parse(image: Vec<u8>) -> CoreResult<Self> {
        BufferedHeader::parse(image).map(Self::Buffered)
    }

    /// Creates the header of a synthesized empty store.
    #[must_use]
    pub fn detached(record_length: u16) -> Self {
        Self::Detached(HeaderFields {
            record_length,
            physical_record_length: record_length,
            ..HeaderFields::default()
        })
    }

    /// Reads a field.
    #[must_use]
    pub fn get(&self, field: HeaderField) -> u16 {
        match self {
            Self::Buffered(header) => header.get(field),
            Self::Detached(fields) => fields.get(field),
        }
    }

    /// Writes a field.
    pub fn set(&mut self, field: HeaderField, value: u16) {
        match self {
            Self::Buffered(header) => header.set(field, value),
            Self::Detached(fields) => fields.set(field, value),
        }
    }

    /// Returns a snapshot of every field.
    #[must_use]
    pub fn fields(&self) -> HeaderFields {
        match self {
            Self::Buffered(header) => {
                let mut fields = HeaderFields::default();
                for field in HeaderField::ALL {
                    fields.set(field, header.get(field));
                }
                fields
            }
            Self::Detached(fields) => *fields,
        }
    }

    /// Returns the page length.
    #[must_use]
    pub fn page_length(&self) -> u16 {
        self.get(HeaderField::PageLength)
    }

    /// Returns the declared key count.
    #[must_use]
    pub fn key_count(&self) -> u16 {
        self.get(HeaderField::KeyCount)
    }

    /// Returns the record length stored in the header.
    #[must_use]
    pub fn record_length(&self) -> u16 {
        self.get(HeaderField::RecordLength)
    }

    /// Returns the physical record length.
    #[must_use]
    pub fn physical_record_length(&self) -> u16 {
        self.get(HeaderField::PhysicalRecordLength)
    }

    /// Returns the record count.
    #[must_use]
    pub fn record_count(&self) -> u16 {
        self.get(HeaderField::RecordCount)
    }

    /// Returns the page count; only available with a file image.
    #[must_use]
    pub fn page_count(&self) -> Option<u32> {
        match self {
            Self::Buffered(header) => header.page_count(),
            Self::Detached(_) => None,
        }
    }

    /// Returns the backing file image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&[u8]> {
        match self {
            Self::Buffered(header) => Some(header.image()),
            Self::Detached(_) => None,
        }
    }

    /// Returns `true` if the header is backed by a file image.
    #[must_use]
    pub const fn is_buffered(&self) -> bool {
        matches!(self, Self::Buffered(_))
    }
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_image() -> Vec<u8> {
        let mut image = vec![0u8; 4 * 512];
        write_u16(&mut image, PAGE_LENGTH_OFFSET, 512);
        write_u16(&mut image, KEY_COUNT_OFFSET, 2);
        write_u16(&mut image, RECORD_LENGTH_OFFSET, 64);
        write_u16(&mut image, PHYSICAL_RECORD_LENGTH_OFFSET, 70);
        write_u16(&mut image, RECORD_COUNT_OFFSET, 3);
        image
    }

    #[test]
    fn parse_reads_fixed_offsets() {
        let header = FileHeader::parse(sample_image()).unwrap();

        assert!(header.is_buffered());
        assert_eq!(header.page_length(), 512);
        assert_eq!(header.key_count(), 2);
        assert_eq!(header.record_length(), 64);
        assert_eq!(header.physical_record_length(), 70);
        assert_eq!(header.record_count(), 3);
    }

    #[test]
    fn parse_rejects_short_image() {
        let result = FileHeader::parse(vec![0u8; MIN_HEADER_SIZE - 1]);
        assert!(matches!(result, Err(CoreError::Format { .. })));

        assert!(FileHeader::parse(vec![0u8; MIN_HEADER_SIZE]).is_ok());
    }

    #[test]
    fn buffered_writes_reach_the_image() {
        let mut header = FileHeader::parse(sample_image()).unwrap();
        header.set(HeaderField::RecordCount, 0x1234);

        let image = header.image().unwrap();
        assert_eq!(&image[RECORD_COUNT_OFFSET..RECORD_COUNT_OFFSET + 2], &[0x34, 0x12]);
        assert_eq!(header.record_count(), 0x1234);
    }

    #[test]
    fn page_count_from_image_length() {
        let header = FileHeader::parse(sample_image()).unwrap();
        assert_eq!(header.page_count(), Some(3));

        let mut image = sample_image();
        write_u16(&mut image, PAGE_LENGTH_OFFSET, 0);
        assert_eq!(FileHeader::parse(image).unwrap().page_count(), None);

        let mut image = vec![0u8; 100];
        write_u16(&mut image, PAGE_LENGTH_OFFSET, 512);
        assert_eq!(FileHeader::parse(image).unwrap().page_count(), None);
    }

    #[test]
    fn detached_header_has_no_image() {
        let mut header = FileHeader::detached(128);

        assert!(!header.is_buffered());
        assert!(header.image().is_none());
        assert_eq!(header.page_count(), None);
        assert_eq!(header.record_length(), 128);
        assert_eq!(header.physical_record_length(), 128);
        assert_eq!(header.record_count(), 0);

        header.set(HeaderField::RecordCount, 1);
        assert_eq!(header.fields().record_count, 1);
    }

    #[test]
    fn fields_write_to_matches_buffered_view() {
        let header = FileHeader::parse(sample_image()).unwrap();
        let mut rebuilt = vec![0u8; 4 * 512];
        header.fields().write_to(&mut rebuilt);
        assert_eq!(rebuilt, sample_image());
    }

    proptest! {
        #[test]
        fn decode_then_encode_reproduces_image(
            image in prop::collection::vec(any::<u8>(), MIN_HEADER_SIZE..1024)
        ) {
            let mut header = FileHeader::parse(image.clone()).unwrap();
            for field in HeaderField::ALL {
                let value = header.get(field);
                header.set(field, value);
            }
            prop_assert_eq!(header.image().unwrap(), image.as_slice());
        }
    }
}
