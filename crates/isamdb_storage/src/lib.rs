//! # isamdb Storage
//!
//! Byte-level storage backends for isamdb.
//!
//! Backends are **opaque byte stores**: they know nothing about legacy
//! headers, key descriptors or record areas. `isamdb_core` owns all format
//! interpretation and only ever asks a backend for bytes.
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - For legacy data files on disk
//!
//! ## Example
//!
//! ```no_run
//! use isamdb_storage::{FileBackend, StorageBackend};
//! use std::path::Path;
//!
//! let mut copy = FileBackend::create(Path::new("COPY.DAT")).unwrap();
//! let source = FileBackend::open_existing(Path::new("ACCOUNTS.DAT")).unwrap();
//! copy.append(&source.read_all().unwrap()).unwrap();
//! copy.flush().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
