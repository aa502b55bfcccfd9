//! Chat configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::conversation::MAX_HISTORY_MESSAGES;
use crate::domain::persona::Language;

/// Conversation behaviour settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Number of prior messages sent with each turn (1..=10)
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Language used when the user has not chosen one
    #[serde(default)]
    pub default_language: Language,
}

impl ChatConfig {
    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_window == 0 || self.history_window > MAX_HISTORY_MESSAGES {
            return Err(ValidationError::InvalidHistoryWindow(self.history_window));
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            default_language: Language::default(),
        }
    }
}

fn default_history_window() -> usize {
    MAX_HISTORY_MESSAGES
}
