//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::ValidationError;
use crate::adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
use crate::ports::KeyValueStore;

/// Which key/value store backs sessions and settings
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost on exit
    #[default]
    Memory,
    /// One JSON file per key under `data_dir`
    File,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::File {
            let missing = self
                .data_dir
                .as_ref()
                .map_or(true, |dir| dir.as_os_str().is_empty());
            if missing {
                return Err(ValidationError::MissingRequired("storage.data_dir"));
            }
        }
        Ok(())
    }

    /// Build the configured store
    pub fn build_store(&self) -> Result<Arc<dyn KeyValueStore>, ValidationError> {
        self.validate()?;
        match (&self.backend, &self.data_dir) {
            (StorageBackend::File, Some(dir)) => Ok(Arc::new(FileKeyValueStore::new(dir))),
            (StorageBackend::File, None) => Err(ValidationError::MissingRequired("storage.data_dir")),
            (StorageBackend::Memory, _) => Ok(Arc::new(InMemoryKeyValueStore::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_is_default() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert!(config.validate().is_ok());
        assert!(config.build_store().is_ok());
    }

    #[test]
    fn test_file_backend_requires_data_dir() {
        let config = StorageConfig {
            backend: StorageBackend::File,
            data_dir: None,
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("storage.data_dir"))
        ));

        let empty = StorageConfig {
            backend: StorageBackend::File,
            data_dir: Some(PathBuf::new()),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_file_backend_builds() {
        let config = StorageConfig {
            backend: StorageBackend::File,
            data_dir: Some(PathBuf::from("./data")),
        };
        assert!(config.build_store().is_ok());
    }
}
