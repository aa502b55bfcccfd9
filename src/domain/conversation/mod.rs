//! Conversation domain module.
//!
//! Sessions, messages, the turn lifecycle, and the turn request builder.

mod history;
mod message;
mod mood;
mod request;
mod session;
pub mod templates;
mod turn_state;

pub use history::{HistoryWindow, MAX_HISTORY_MESSAGES};
pub use message::{Message, Sender};
pub use mood::Mood;
pub use request::{TurnPreferences, TurnRequest, TurnRequestBuilder, TurnResult};
pub use session::{Session, SessionSnapshot};
pub use turn_state::TurnState;
