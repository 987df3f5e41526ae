//! Engine configuration.

use crate::header::RECORD_DATA_OFFSET;
use std::path::{Path, PathBuf};

/// Configuration for opening stores.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory used when an open call supplies no base path.
    ///
    /// `None` means the process working directory.
    pub base_path: Option<PathBuf>,

    /// Whether opening a missing file synthesizes an empty store.
    ///
    /// The legacy host silently creates a blank store, so this is on by
    /// default.
    pub create_if_missing: bool,

    /// Byte offset of record 0 in the fixed record layout.
    ///
    /// Stores refuse to open when this is smaller than
    /// [`MIN_HEADER_SIZE`](crate::header::MIN_HEADER_SIZE), since records
    /// would overwrite header fields.
    pub record_data_offset: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: None,
            create_if_missing: true,
            record_data_offset: RECORD_DATA_OFFSET,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default base directory.
    #[must_use]
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets whether missing files synthesize an empty store.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the offset of the record area.
    #[must_use]
    pub const fn record_data_offset(mut self, offset: usize) -> Self {
        self.record_data_offset = offset;
        self
    }

    /// Resolves the path of `file_name`.
    ///
    /// An explicit, non-empty `base_path` wins over the configured one; with
    /// neither, the name is resolved against the working directory.
    #[must_use]
    pub fn resolve(&self, file_name: &str, base_path: Option<&Path>) -> PathBuf {
        match base_path.filter(|p| !p.as_os_str().is_empty()) {
            Some(base) => base.join(file_name),
            None => match &self.base_path {
                Some(base) => base.join(file_name),
                None => PathBuf::from(file_name),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(config.base_path.is_none());
        assert_eq!(config.record_data_offset, 0x206);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .base_path("/srv/modules")
            .record_data_offset(0x400);

        assert!(!config.create_if_missing);
        assert_eq!(config.base_path.as_deref(), Some(Path::new("/srv/modules")));
        assert_eq!(config.record_data_offset, 0x400);
    }

    #[test]
    fn resolve_prefers_explicit_base() {
        let config = Config::new().base_path("/configured");

        assert_eq!(
            config.resolve("USERS.DAT", Some(Path::new("/explicit"))),
            Path::new("/explicit/USERS.DAT")
        );
        assert_eq!(
            config.resolve("USERS.DAT", None),
            Path::new("/configured/USERS.DAT")
        );
        assert_eq!(
            config.resolve("USERS.DAT", Some(Path::new(""))),
            Path::new("/configured/USERS.DAT")
        );
    }

    #[test]
    fn resolve_without_any_base_is_relative() {
        let config = Config::default();
        assert_eq!(config.resolve("USERS.DAT", None), Path::new("USERS.DAT"));
    }
}
