//! Key descriptors.
//!
//! A raw descriptor carries the sample key field bytes starting at byte 4 and
//! ends with a 32-bit little-endian value whose two 16-bit halves are stored
//! swapped. Swapping them back yields the record-relative offset of the key
//! field:
//!
//! ```text
//! descriptor: [ 4 bytes | key bytes (length) ... | tail: u32 LE, halves swapped ]
//! offset    = ((v >> 16) & 0xFFFF) | ((v << 16) & 0xFFFF_0000)
//! ```
//!
//! This is a word swap, not a byte swap. Only the sample files seen so far
//! are known to use it, so it stays local to this module.

use crate::error::{CoreError, CoreResult};
use std::ops::Range;

/// Number of trailing descriptor bytes holding the swapped offset.
pub const OFFSET_TAIL_LEN: usize = 4;

/// Index of the first sample key byte inside a descriptor.
pub const KEY_BYTES_START: usize = 4;

/// Swaps the 16-bit halves of a little-endian 32-bit value.
#[must_use]
pub fn decode_swapped_offset(tail: [u8; 4]) -> u32 {
    let v = u32::from_le_bytes(tail);
    ((v >> 16) & 0xFFFF) | ((v << 16) & 0xFFFF_0000)
}

/// One key definition of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    number: u16,
    length: u16,
    data: Vec<u8>,
}

impl KeyDescriptor {
    /// Creates a descriptor from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKeyDescriptor`] if `data` cannot hold the
    /// offset tail or `length` sample key bytes.
    pub fn new(number: u16, length: u16, data: Vec<u8>) -> CoreResult<Self> {
        let needed = (KEY_BYTES_START + usize::from(length)).max(OFFSET_TAIL_LEN);
        if data.len() < needed {
            return Err(CoreError::invalid_key_descriptor(format!(
                "key {number}: descriptor has {} bytes, needs at least {needed}",
                data.len()
            )));
        }

        Ok(Self {
            number,
            length,
            data,
        })
    }

    /// Returns the key number.
    #[must_use]
    pub const fn number(&self) -> u16 {
        self.number
    }

    /// Returns the declared key length.
    #[must_use]
    pub const fn length(&self) -> u16 {
        self.length
    }

    /// Returns the raw descriptor bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the record-relative offset of the key field.
    #[must_use]
    pub fn offset(&self) -> u32 {
        let start = self.data.len() - OFFSET_TAIL_LEN;
        let mut tail = [0u8; OFFSET_TAIL_LEN];
        tail.copy_from_slice(&self.data[start..]);
        decode_swapped_offset(tail)
    }

    /// Returns the sample key bytes carried by the descriptor.
    #[must_use]
    pub fn key_bytes(&self) -> &[u8] {
        &self.data[KEY_BYTES_START..KEY_BYTES_START + usize::from(self.length)]
    }

    /// Returns the byte range the key field occupies inside a record.
    #[must_use]
    pub fn field_range(&self) -> Range<usize> {
        let start = self.offset() as usize;
        start..start.saturating_add(usize::from(self.length))
    }

    /// Returns `true` if `record` holds `key` at this key's field.
    ///
    /// `key` may be shorter than the field, in which case only its own
    /// length is compared; a longer key never matches.
    #[must_use]
    pub fn matches(&self, record: &[u8], key: &[u8]) -> bool {
        let field = self.field_range();
        if key.len() > field.len() {
            return false;
        }
        record
            .get(field.start..field.start + key.len())
            .is_some_and(|bytes| bytes == key)
    }
}

/// Key descriptors of a store, in definition order.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: Vec<KeyDescriptor>,
}

impl KeySet {
    /// Creates an empty key set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if the key number is taken.
    pub fn insert(&mut self, key: KeyDescriptor) -> CoreResult<()> {
        if self.get(key.number()).is_some() {
            return Err(CoreError::DuplicateKey {
                number: key.number(),
            });
        }
        self.keys.push(key);
        Ok(())
    }

    /// Looks up a descriptor by key number.
    #[must_use]
    pub fn get(&self, number: u16) -> Option<&KeyDescriptor> {
        self.keys.iter().find(|k| k.number() == number)
    }

    /// Returns the number of defined keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over descriptors in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyDescriptor> {
        self.keys.iter()
    }
}
