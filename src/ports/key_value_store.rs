//! Key/Value Store Port - Interface for the durable local store.
//!
//! Sessions and settings are mirrored into a flat string store keyed by
//! [`StorageKey`]. The store is a mirror of in-memory state, never the
//! source of truth.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::{ChatError, PersonaKey};

/// Errors that can occur during key/value operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The write would exceed the store's capacity.
    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("IO error: {0}")]
    Io(String),

    /// The store refuses writes (read-only or disabled).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for ChatError {
    fn from(err: StorageError) -> Self {
        ChatError::persistence_write_failed(err.to_string())
    }
}

/// Well-known keys of the local store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Message log of one persona's session.
    Session(PersonaKey),
    /// User profile (`{name, avatarRef}`).
    Profile,
    /// Raw language name.
    LanguagePreference,
    /// JSON map of persona key to conversation style.
    PersonaStyles,
    /// JSON map of persona key to display overrides.
    PersonaOverrides,
}

impl StorageKey {
    /// Returns the key string as stored.
    pub fn as_key(&self) -> String {
        match self {
            StorageKey::Session(persona) => format!("session:{}", persona),
            StorageKey::Profile => "profile".to_string(),
            StorageKey::LanguagePreference => "language-preference".to_string(),
            StorageKey::PersonaStyles => "persona-styles".to_string(),
            StorageKey::PersonaOverrides => "persona-overrides".to_string(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// Port for the durable key/value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    /// `None` if no value is stored under the key
    async fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns `StorageError::QuotaExceeded` if the store is full
    async fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError>;

    /// Removes a value. Removing an absent key is not an error.
    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError>;
}
