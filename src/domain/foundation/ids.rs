//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Reserved id of the synthetic greeting message.
pub const INITIAL_MESSAGE_ID: &str = "initial";

/// Unique identifier for a message within a session.
///
/// Generated ids are UUID v4 strings. The reserved value `"initial"` marks
/// the synthetic greeting and is never produced by [`MessageId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id of the synthetic greeting.
    pub fn initial() -> Self {
        Self(INITIAL_MESSAGE_ID.to_string())
    }

    /// Returns true if this is the greeting id.
    pub fn is_initial(&self) -> bool {
        self.0 == INITIAL_MESSAGE_ID
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ValidationError::empty_field("message_id"));
        }
        Ok(Self(s.to_string()))
    }
}

/// Key of a persona, also the persistence partition key of its session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaKey(String);

impl PersonaKey {
    /// Creates a new PersonaKey.
    ///
    /// Keys are limited to `[A-Za-z0-9_-]` so they map one-to-one onto
    /// storage keys and file names.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::empty_field("persona_key"));
        }
        if let Some(bad) = key
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValidationError::invalid_format(
                "persona_key",
                format!("unsupported character {:?}", bad),
            ));
        }
        Ok(Self(key))
    }

    /// Creates a key from a compile-time literal.
    pub(crate) fn from_static(key: &'static str) -> Self {
        Self(key.to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
