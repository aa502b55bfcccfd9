//! File-based Key/Value Store Adapter
//!
//! Stores each key as one file under a base directory. Writes go to a
//! temporary file first and are renamed into place, so a crash never leaves
//! a half-written value behind.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{KeyValueStore, StorageError, StorageKey};

/// File-based key/value store
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./data/persona-chat");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a key.
    ///
    /// Characters outside `[A-Za-z0-9_-]` become `_`, so `session:brother`
    /// maps to `session_brother.json`. Persona keys never contain such
    /// characters, so the `session:` separator is the only one replaced.
    fn value_path(&self, key: &StorageKey) -> PathBuf {
        let name: String = key
            .as_key()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", name))
    }

    /// Ensure the base directory exists
    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.value_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        let path = self.value_path(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        match fs::remove_file(self.value_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PersonaKey;
    use tempfile::TempDir;

    fn session_key(persona: &str) -> StorageKey {
        StorageKey::Session(PersonaKey::new(persona).unwrap())
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set(&session_key("brother"), "[]").await.unwrap();

        let value = store.get(&session_key("brother")).await.unwrap();
        assert_eq!(value.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert!(store.get(&StorageKey::Profile).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_creates_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let store = FileKeyValueStore::new(&nested);

        store.set(&StorageKey::Profile, "{}").await.unwrap();

        assert!(nested.join("profile.json").exists());
    }

    #[tokio::test]
    async fn test_session_key_is_sanitized() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set(&session_key("mother"), "[]").await.unwrap();

        assert!(temp_dir.path().join("session_mother.json").exists());
        assert!(!temp_dir.path().join("session_mother.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_distinct_persona_keys_use_distinct_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set(&session_key("a_b"), "one").await.unwrap();
        store.set(&session_key("a-b"), "two").await.unwrap();

        assert_eq!(store.get(&session_key("a_b")).await.unwrap().as_deref(), Some("one"));
        assert_eq!(store.get(&session_key("a-b")).await.unwrap().as_deref(), Some("two"));
        assert!(PersonaKey::new("a:b").is_err());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set(&StorageKey::LanguagePreference, "English").await.unwrap();
        store.set(&StorageKey::LanguagePreference, "Hindi").await.unwrap();

        let value = store.get(&StorageKey::LanguagePreference).await.unwrap();
        assert_eq!(value.as_deref(), Some("Hindi"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set(&session_key("father"), "[]").await.unwrap();
        store.remove(&session_key("father")).await.unwrap();
        store.remove(&session_key("father")).await.unwrap();

        assert!(store.get(&session_key("father")).await.unwrap().is_none());
    }
}
