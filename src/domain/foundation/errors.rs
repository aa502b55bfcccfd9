//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Stable error codes surfaced to callers of the chat core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    PersonaNotFound,
    MessageNotFound,
    Busy,
    GenerationFailed,
    PersistenceWriteFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::PersonaNotFound => "PERSONA_NOT_FOUND",
            ErrorCode::MessageNotFound => "MESSAGE_NOT_FOUND",
            ErrorCode::Busy => "BUSY",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
            ErrorCode::PersistenceWriteFailed => "PERSISTENCE_WRITE_FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Errors produced by the persona chat core.
///
/// Only [`ChatError::GenerationFailed`] and [`ChatError::Busy`] are meant to
/// reach the user as a visible notice. The rest are prevented by input
/// validation, handled by redirecting, or tolerated and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// User input was rejected before any dispatch.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// No persona is registered under the requested key.
    #[error("Persona not found: {0}")]
    PersonaNotFound(String),

    /// No message with the given id exists in the session.
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// A turn is already awaiting its response for this session.
    #[error("A response is already being generated for this conversation")]
    Busy,

    /// The model call returned no usable text or media.
    #[error("Generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// Writing the session mirror failed. Never fails a turn.
    #[error("Persistence write failed: {reason}")]
    PersistenceWriteFailed { reason: String },
}

impl ChatError {
    /// Creates an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        ChatError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a generation failure.
    pub fn generation_failed(reason: impl Into<String>) -> Self {
        ChatError::GenerationFailed {
            reason: reason.into(),
        }
    }

    /// Creates a persistence write failure.
    pub fn persistence_write_failed(reason: impl Into<String>) -> Self {
        ChatError::PersistenceWriteFailed {
            reason: reason.into(),
        }
    }

    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::InvalidInput { .. } => ErrorCode::InvalidInput,
            ChatError::PersonaNotFound(_) => ErrorCode::PersonaNotFound,
            ChatError::MessageNotFound(_) => ErrorCode::MessageNotFound,
            ChatError::Busy => ErrorCode::Busy,
            ChatError::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            ChatError::PersistenceWriteFailed { .. } => ErrorCode::PersistenceWriteFailed,
        }
    }

    /// Returns true if the error should be shown to the user as a notice.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ChatError::GenerationFailed { .. } | ChatError::Busy)
    }
}

impl From<ValidationError> for ChatError {
    fn from(err: ValidationError) -> Self {
        ChatError::invalid_input(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("user_text");
        assert_eq!(format!("{}", err), "Field 'user_text' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("image", "missing base64 marker");
        assert_eq!(
            format!("{}", err),
            "Field 'image' has invalid format: missing base64 marker"
        );
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::PersonaNotFound), "PERSONA_NOT_FOUND");
        assert_eq!(format!("{}", ErrorCode::GenerationFailed), "GENERATION_FAILED");
    }

    #[test]
    fn chat_error_maps_to_codes() {
        assert_eq!(ChatError::Busy.code(), ErrorCode::Busy);
        assert_eq!(
            ChatError::PersonaNotFound("uncle".to_string()).code(),
            ErrorCode::PersonaNotFound
        );
        assert_eq!(
            ChatError::generation_failed("no text").code(),
            ErrorCode::GenerationFailed
        );
    }

    #[test]
    fn only_busy_and_generation_failures_are_user_visible() {
        assert!(ChatError::Busy.is_user_visible());
        assert!(ChatError::generation_failed("x").is_user_visible());

        assert!(!ChatError::invalid_input("empty").is_user_visible());
        assert!(!ChatError::PersonaNotFound("x".to_string()).is_user_visible());
        assert!(!ChatError::MessageNotFound("x".to_string()).is_user_visible());
        assert!(!ChatError::persistence_write_failed("quota").is_user_visible());
    }

    #[test]
    fn validation_error_converts_to_invalid_input() {
        let err: ChatError = ValidationError::empty_field("user_text").into();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(err.to_string().contains("user_text"));
    }
}
