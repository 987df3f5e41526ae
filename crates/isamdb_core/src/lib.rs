//! # isamdb Core
//!
//! File model of a legacy indexed-sequential (ISAM) data file, as seen by
//! 16-bit business applications running under emulation.
//!
//! This crate provides:
//! - [`FileHeader`] - bit-exact access to the fixed-offset header fields
//! - [`RecordStore`] - fixed-length records with ordered-array CRUD
//! - [`KeyDescriptor`] - key field offsets in their word-swapped encoding
//! - [`Cursor`] - step-style navigation with the legacy unchecked step-next
//! - [`Engine`] - handle-based facade driven by the execution environment
//!
//! Mutations are kept in memory for the lifetime of the session; nothing is
//! written back to the original file.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod cursor;
mod engine;
mod error;
pub mod header;
pub mod key;
mod record;
mod store;
mod types;

pub use config::Config;
pub use context::CurrentStore;
pub use cursor::Cursor;
pub use engine::Engine;
pub use error::{CoreError, CoreResult};
pub use header::{FileHeader, HeaderField, HeaderFields};
pub use key::{KeyDescriptor, KeySet};
pub use record::{RecordStore, MAX_RECORDS};
pub use store::Store;
pub use types::{ObtainOption, Status, StepOption, StoreHandle};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
