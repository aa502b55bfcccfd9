//! Conversation handlers.
//!
//! Dispatching turns to the persona model, owning per-persona session state,
//! and the service that ties personas, settings and storage together.

mod chat_service;
mod dispatcher;
mod session_controller;

pub use chat_service::ChatService;
pub use dispatcher::{ConversationDispatcher, FALLBACK_VOICE_LINE, VARIANT_COUNT};
pub use session_controller::{SessionController, TurnOutcome};
