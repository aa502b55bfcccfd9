//! Settings query handlers.
//!
//! Read-only access to the profile, language and per-persona settings.

mod reader;

pub use reader::{SettingsReader, UserProfile};
