//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers and error types that form the vocabulary
//! of the persona chat domain.

mod errors;
mod ids;

pub use errors::{ChatError, ErrorCode, ValidationError};
pub use ids::{MessageId, PersonaKey, INITIAL_MESSAGE_ID};
