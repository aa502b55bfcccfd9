//! Session aggregate - the ordered message log of one persona.
//!
//! The session owns every message in it and the image-continuity state that
//! feeds the next turn request. Only the session controller mutates it.

use serde::{Deserialize, Serialize};

use super::Message;
use crate::domain::foundation::{ChatError, MessageId, PersonaKey};
use crate::domain::persona::Persona;

/// Conversation state for one persona on this device.
///
/// # Invariants
///
/// - `messages` are in conversation order (insertion order)
/// - at most one message has the greeting id, and it can't be deleted
/// - `last_image_ref` is the most recent image produced by a reply, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    persona_key: PersonaKey,
    messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_image_ref: Option<String>,
}

/// Opaque copy of a session taken before an optimistic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot(Session);

/// Persisted forms accepted on load.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSession {
    Current(Session),
    /// Bare message array written by older clients.
    Legacy(Vec<Message>),
}

impl Session {
    /// Starts a fresh session holding only the persona's greeting.
    pub fn start(persona: &Persona) -> Self {
        Self {
            persona_key: persona.key.clone(),
            messages: vec![Message::greeting(persona)],
            last_image_ref: None,
        }
    }

    /// Decodes a persisted session for `persona`.
    ///
    /// An empty message log decodes to a fresh session.
    pub fn from_json(persona: &Persona, json: &str) -> Result<Self, serde_json::Error> {
        let (messages, last_image_ref) = match serde_json::from_str::<StoredSession>(json)? {
            StoredSession::Current(session) => (session.messages, session.last_image_ref),
            StoredSession::Legacy(messages) => (messages, None),
        };

        if messages.is_empty() {
            return Ok(Self::start(persona));
        }

        Ok(Self {
            persona_key: persona.key.clone(),
            messages,
            last_image_ref,
        })
    }

    /// Encodes the session for the persistence mirror.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn persona_key(&self) -> &PersonaKey {
        &self.persona_key
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_image_ref(&self) -> Option<&str> {
        self.last_image_ref.as_deref()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| m.id() == id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a user message at the end of the log.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends a persona reply and carries its image forward, if any.
    pub fn record_reply(&mut self, reply: Message) {
        if let Some(image) = reply.image_ref() {
            self.last_image_ref = Some(image.to_string());
        }
        self.messages.push(reply);
    }

    /// Removes a single message.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for the greeting
    /// - `MessageNotFound` if no message has this id
    pub fn delete_message(&mut self, id: &MessageId) -> Result<Message, ChatError> {
        if id.is_initial() {
            return Err(ChatError::invalid_input("the greeting message cannot be deleted"));
        }
        let index = self
            .messages
            .iter()
            .position(|m| m.id() == id)
            .ok_or_else(|| ChatError::MessageNotFound(id.to_string()))?;
        Ok(self.messages.remove(index))
    }

    /// Replaces the log with a single fresh greeting and clears the image.
    pub fn reset(&mut self, persona: &Persona) {
        *self = Self::start(persona);
    }

    /// Captures the current state for a later [`Session::restore`].
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot(self.clone())
    }

    /// Restores a previously captured state.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        *self = snapshot.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::PersonaRegistry;

    fn persona() -> Persona {
        PersonaRegistry::builtin().lookup("brother").unwrap().clone()
    }

    #[test]
    fn start_holds_only_greeting() {
        let session = Session::start(&persona());
        assert_eq!(session.len(), 1);
        assert!(session.messages()[0].is_greeting());
        assert!(session.last_image_ref().is_none());
    }

    #[test]
    fn record_reply_with_image_updates_last_image() {
        let mut session = Session::start(&persona());
        session.record_reply(Message::ai("Here!", Some("data:image/png;base64,AAA".into())).unwrap());
        assert_eq!(session.last_image_ref(), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn record_reply_without_image_keeps_last_image() {
        let mut session = Session::start(&persona());
        session.record_reply(Message::ai("Here!", Some("data:image/png;base64,AAA".into())).unwrap());
        session.record_reply(Message::ai("Anything else?", None).unwrap());
        assert_eq!(session.last_image_ref(), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn greeting_cannot_be_deleted() {
        let mut session = Session::start(&persona());
        let err = session.delete_message(&MessageId::initial()).unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput { .. }));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn delete_removes_only_the_target() {
        let mut session = Session::start(&persona());
        let first = Message::user("one").unwrap();
        let second = Message::user("two").unwrap();
        let first_id = first.id().clone();
        session.append(first);
        session.append(second);

        let removed = session.delete_message(&first_id).unwrap();

        assert_eq!(removed.text(), "one");
        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[1].text(), "two");
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let mut session = Session::start(&persona());
        let err = session.delete_message(&MessageId::new()).unwrap_err();
        assert!(matches!(err, ChatError::MessageNotFound(_)));
    }

    #[test]
    fn restore_returns_exact_prior_state() {
        let mut session = Session::start(&persona());
        let before = session.clone();
        let snapshot = session.snapshot();

        session.append(Message::user("hi").unwrap());
        session.restore(snapshot);

        assert_eq!(session, before);
    }

    #[test]
    fn reset_clears_log_and_image() {
        let persona = persona();
        let mut session = Session::start(&persona);
        session.append(Message::user("draw").unwrap());
        session.record_reply(Message::ai("Here!", Some("data:image/png;base64,AAA".into())).unwrap());

        session.reset(&persona);

        assert_eq!(session.len(), 1);
        assert_eq!(session.messages()[0].text(), persona.initial_message);
        assert!(session.last_image_ref().is_none());
    }

    #[test]
    fn json_round_trip_preserves_session() {
        let persona = persona();
        let mut session = Session::start(&persona);
        session.append(Message::user("Hello").unwrap());
        session.record_reply(Message::ai("Yo", Some("data:image/png;base64,AAA".into())).unwrap());

        let json = session.to_json().unwrap();
        let decoded = Session::from_json(&persona, &json).unwrap();

        assert_eq!(decoded, session);
        assert!(json.contains("\"lastImageRef\""));
        assert!(json.contains("\"personaKey\":\"brother\""));
    }

    #[test]
    fn decodes_legacy_message_array() {
        let persona = persona();
        let json = r#"[
            {"id":"initial","sender":"ai","text":"What's up?"},
            {"id":"abc","sender":"user","text":"Nothing much"}
        ]"#;

        let session = Session::from_json(&persona, json).unwrap();

        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[1].text(), "Nothing much");
        assert!(session.last_image_ref().is_none());
    }

    #[test]
    fn empty_log_decodes_to_fresh_session() {
        let persona = persona();
        let session = Session::from_json(&persona, "[]").unwrap();
        assert_eq!(session, Session::start(&persona));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Session::from_json(&persona(), "{not json").is_err());
    }
}
