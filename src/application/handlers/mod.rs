//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod conversation;
pub mod settings;

pub use conversation::{
    ChatService, ConversationDispatcher, SessionController, TurnOutcome, FALLBACK_VOICE_LINE,
    VARIANT_COUNT,
};
pub use settings::{SettingsReader, UserProfile};
