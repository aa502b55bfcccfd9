//! History window for turn requests.
//!
//! Keeps the most recent messages of a session, oldest first, so a turn
//! carries bounded conversational context.

use super::Message;

/// Upper bound on the number of history lines sent with a turn.
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// Rendered recent-message slice supplied to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    lines: Vec<String>,
    truncated_count: usize,
}

impl HistoryWindow {
    /// Builds a window of the last `limit` messages.
    ///
    /// `limit` is clamped to [`MAX_HISTORY_MESSAGES`].
    pub fn from_messages(messages: &[Message], limit: usize) -> Self {
        let limit = limit.min(MAX_HISTORY_MESSAGES);
        let start = messages.len().saturating_sub(limit);

        Self {
            lines: messages[start..].iter().map(Message::history_line).collect(),
            truncated_count: start,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of older messages left out of the window.
    pub fn truncated_count(&self) -> usize {
        self.truncated_count
    }

    /// Joins the lines with newlines, as the model expects.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}
