//! Error types for isamdb core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in isamdb core operations.
///
/// Every error aborts only the operation that raised it; the store and the
/// session stay usable.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] isamdb_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file content cannot be a valid legacy data file.
    #[error("invalid file format: {message}")]
    Format {
        /// Description of the format issue.
        message: String,
    },

    /// A record buffer does not have the declared record length.
    #[error("record length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// The store's declared record length.
        expected: usize,
        /// Length of the rejected buffer.
        actual: usize,
    },

    /// A record index is outside the store.
    #[error("record index {index} out of range (record count {count})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The record count at the time of the request.
        count: usize,
    },

    /// The 16-bit record count field cannot grow any further.
    #[error("store is full: record count cannot exceed {max}")]
    StoreFull {
        /// Largest representable record count.
        max: usize,
    },

    /// A key descriptor is too short for its declared length.
    #[error("invalid key descriptor: {message}")]
    InvalidKeyDescriptor {
        /// Description of the problem.
        message: String,
    },

    /// A key number was defined twice.
    #[error("key {number} is already defined")]
    DuplicateKey {
        /// The repeated key number.
        number: u16,
    },

    /// The file does not exist and auto-creation is disabled.
    #[error("store not found: {name}")]
    StoreNotFound {
        /// Name of the missing file.
        name: String,
    },

    /// A handle does not refer to an open store.
    #[error("unknown store handle: {handle}")]
    UnknownHandle {
        /// The rejected handle value.
        handle: u16,
    },

    /// No more handles can be allocated.
    #[error("store handles exhausted")]
    HandlesExhausted,

    /// An operation needed the current store but none was set.
    #[error("no current store has been set")]
    NoCurrentStore,

    /// A legacy step option code is not recognised.
    #[error("unknown step option code: {code}")]
    UnknownStepOption {
        /// The raw option code.
        code: u16,
    },

    /// A legacy obtain option code is not supported.
    #[error("unsupported obtain option code: {code}")]
    UnsupportedObtainOption {
        /// The raw option code.
        code: u16,
    },
}

impl CoreError {
    /// Creates a file format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Creates an index out of range error.
    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Creates an invalid key descriptor error.
    pub fn invalid_key_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidKeyDescriptor {
            message: message.into(),
        }
    }
}
