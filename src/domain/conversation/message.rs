//! Message entity for persona sessions.
//!
//! Messages are immutable records of user/persona exchanges. Each message has
//! a sender, text, and an optional image produced alongside the reply.

use crate::domain::foundation::{MessageId, ValidationError};
use crate::domain::persona::Persona;
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person chatting.
    User,
    /// The persona (model output or synthetic greeting).
    Ai,
}

impl Sender {
    /// Returns the label used in history lines.
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Ai => "AI",
        }
    }
}

/// An immutable message within a session.
///
/// # Invariants
///
/// - `id` is unique within the session and never reused
/// - `id == "initial"` only for the synthetic greeting
/// - user text is non-empty after trimming (validated at construction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_ref: Option<String>,
}

impl Message {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if text is empty after trimming
    pub fn user(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        Self::validate_text(&text)?;

        Ok(Self {
            id: MessageId::new(),
            sender: Sender::User,
            text,
            image_ref: None,
        })
    }

    /// Creates a persona reply, optionally carrying a produced image.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if text is empty after trimming
    pub fn ai(text: impl Into<String>, image_ref: Option<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        Self::validate_text(&text)?;

        Ok(Self {
            id: MessageId::new(),
            sender: Sender::Ai,
            text,
            image_ref,
        })
    }

    /// Creates the synthetic greeting for a persona.
    pub fn greeting(persona: &Persona) -> Self {
        Self {
            id: MessageId::initial(),
            sender: Sender::Ai,
            text: persona.initial_message.clone(),
            image_ref: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// Returns true if this is the synthetic greeting.
    pub fn is_greeting(&self) -> bool {
        self.id.is_initial()
    }

    /// Renders the message as a history line (`"User: .."` / `"AI: .."`).
    pub fn history_line(&self) -> String {
        format!("{}: {}", self.sender.label(), self.text)
    }

    fn validate_text(text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::PersonaRegistry;

    mod sender {
        use super::*;

        #[test]
        fn serializes_to_lowercase() {
            assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
            assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
        }

        #[test]
        fn labels_match_history_format() {
            assert_eq!(Sender::User.label(), "User");
            assert_eq!(Sender::Ai.label(), "AI");
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn user_creates_user_message() {
            let msg = Message::user("Hello").unwrap();
            assert_eq!(msg.sender(), Sender::User);
            assert_eq!(msg.text(), "Hello");
            assert!(msg.image_ref().is_none());
            assert!(!msg.is_greeting());
        }

        #[test]
        fn rejects_whitespace_only_text() {
            assert!(Message::user("   ").is_err());
            assert!(Message::ai("", None).is_err());
        }

        #[test]
        fn ai_message_carries_image() {
            let msg = Message::ai("Here!", Some("data:image/png;base64,AAA".to_string())).unwrap();
            assert_eq!(msg.sender(), Sender::Ai);
            assert_eq!(msg.image_ref(), Some("data:image/png;base64,AAA"));
        }

        #[test]
        fn greeting_uses_reserved_id_and_persona_text() {
            let registry = PersonaRegistry::builtin();
            let persona = registry.lookup("father").unwrap();
            let msg = Message::greeting(persona);

            assert!(msg.is_greeting());
            assert_eq!(msg.id().as_str(), "initial");
            assert_eq!(msg.text(), persona.initial_message);
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn history_line_prefixes_sender() {
            assert_eq!(Message::user("Hello").unwrap().history_line(), "User: Hello");
            assert_eq!(Message::ai("Hi!", None).unwrap().history_line(), "AI: Hi!");
        }

        #[test]
        fn json_omits_absent_image() {
            let json = serde_json::to_value(Message::user("Hello").unwrap()).unwrap();
            assert_eq!(json["sender"], "user");
            assert_eq!(json["text"], "Hello");
            assert!(json.get("imageRef").is_none());
        }
    }
}
