//! Turn request builder.
//!
//! Assembles one well-formed request per user turn from the session, the
//! persona, and the user's language and style preferences.

use super::templates::{render_chat_prompt, InstructionTemplate};
use super::{HistoryWindow, Session, MAX_HISTORY_MESSAGES};
use crate::domain::foundation::{ChatError, ValidationError};
use crate::domain::persona::{Language, Persona, PromptRole};

/// User-tunable settings applied to every turn of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnPreferences {
    pub language: Language,
    pub style_override: Option<String>,
}

impl TurnPreferences {
    pub fn new(language: Language, style_override: Option<String>) -> Self {
        Self {
            language,
            style_override,
        }
    }
}

/// Everything the model needs for one turn. Built fresh, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    prompt_role: PromptRole,
    user_text: String,
    history_window: HistoryWindow,
    language: Language,
    style_override: Option<String>,
    context_image_ref: Option<String>,
    instructions: String,
}

impl TurnRequest {
    pub fn prompt_role(&self) -> PromptRole {
        self.prompt_role
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn history_window(&self) -> &HistoryWindow {
        &self.history_window
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn style_override(&self) -> Option<&str> {
        self.style_override.as_deref()
    }

    /// Image produced by the previous turn, carried as visual context.
    pub fn context_image_ref(&self) -> Option<&str> {
        self.context_image_ref.as_deref()
    }

    /// Persona instructions selected for the role.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// History rendered as newline-joined `"Sender: text"` lines.
    pub fn chat_history(&self) -> String {
        self.history_window.render()
    }

    /// Full prompt text: instructions, history, and the user message.
    pub fn prompt(&self) -> String {
        render_chat_prompt(&self.instructions, &self.chat_history(), &self.user_text)
    }
}

/// Outcome of a successful dispatch. Consumed once by the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub response_text: String,
    pub produced_image_ref: Option<String>,
}

impl TurnResult {
    pub fn text(response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            produced_image_ref: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.produced_image_ref = Some(image_ref.into());
        self
    }
}

/// Builds [`TurnRequest`]s with a bounded history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRequestBuilder {
    history_limit: usize,
}

impl TurnRequestBuilder {
    /// Creates a builder keeping `history_limit` messages, clamped to 1..=10.
    pub fn new(history_limit: usize) -> Self {
        Self {
            history_limit: history_limit.clamp(1, MAX_HISTORY_MESSAGES),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Builds the request for `user_text` against the current session.
    ///
    /// `session` must not yet contain the message being sent; the history
    /// window is taken from it as-is.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `user_text` is empty after trimming
    pub fn build(
        &self,
        persona: &Persona,
        session: &Session,
        user_text: &str,
        preferences: &TurnPreferences,
    ) -> Result<TurnRequest, ChatError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(ValidationError::empty_field("user_text").into());
        }

        let style_override = preferences
            .style_override
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let role = persona.prompt_role;
        let instructions = InstructionTemplate::for_role(role).render(
            role,
            preferences.language,
            style_override.as_deref(),
        );

        Ok(TurnRequest {
            prompt_role: role,
            user_text: user_text.to_string(),
            history_window: HistoryWindow::from_messages(session.messages(), self.history_limit),
            language: preferences.language,
            style_override,
            context_image_ref: session.last_image_ref().map(str::to_string),
            instructions,
        })
    }
}

impl Default for TurnRequestBuilder {
    fn default() -> Self {
        Self::new(MAX_HISTORY_MESSAGES)
    }
}
