//! # isamdb Testkit
//!
//! Test utilities for isamdb.
//!
//! This crate provides:
//! - Builders for legacy data file images
//! - Temporary data directories wired to an [`Engine`](isamdb_core::Engine)
//! - Property-based test generators using proptest
//! - A model-checked harness for engine operation sequences
//!
//! ## Usage
//!
//! ```rust,ignore
//! use isamdb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_engine() {
//!     let mut env = TestEngine::new();
//!     env.write_file("ACCOUNTS.DAT", &LegacyImage::new(4).record(b"AAAA").build());
//!     let handle = env.open("ACCOUNTS.DAT", 4);
//!     // ... test operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
