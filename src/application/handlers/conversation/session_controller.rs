//! Session state controller.
//!
//! Owns one persona's [`Session`] and drives the turn lifecycle
//! `Idle -> AwaitingResponse -> Idle`. The user message is appended
//! optimistically; a failed turn restores the pre-append snapshot.
//!
//! Controller state sits behind an async mutex that is released while the
//! model call is outstanding, so deletions stay possible mid-flight. Every
//! committed mutation is mirrored to the key/value store on a best-effort
//! basis: write failures are logged and never fail the operation.
//!
//! Once a turn has entered `AwaitingResponse` its dispatch and commit run on
//! a spawned task. Dropping the `submit` future does not cancel the turn; it
//! still commits or rolls back and returns the controller to `Idle`.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::ConversationDispatcher;
use crate::domain::conversation::{
    Message, Session, SessionSnapshot, TurnPreferences, TurnRequest, TurnRequestBuilder,
    TurnState,
};
use crate::domain::foundation::{ChatError, MessageId, PersonaKey};
use crate::domain::persona::{Language, Persona};
use crate::ports::{KeyValueStore, StorageKey};

/// Messages committed by a successful turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub reply: Message,
}

#[derive(Debug)]
struct ControllerState {
    session: Session,
    turn: TurnState,
    preferences: TurnPreferences,
    /// Bumped by every mutation other than a turn's own append.
    revision: u64,
}

/// A turn that has been appended and is awaiting its reply.
struct PendingTurn {
    user_message: Message,
    snapshot: SessionSnapshot,
    revision: u64,
}

/// Best-effort copy of one session in the key/value store.
#[derive(Clone)]
struct SessionMirror {
    persona_key: PersonaKey,
    store: Arc<dyn KeyValueStore>,
}

impl SessionMirror {
    fn key(&self) -> StorageKey {
        StorageKey::Session(self.persona_key.clone())
    }

    /// Writes the session, logging any failure.
    async fn persist(&self, session: &Session) {
        if let Err(e) = self.try_persist(session).await {
            warn!(persona = %self.persona_key, error = %e, "Session not persisted");
        }
    }

    async fn try_persist(&self, session: &Session) -> Result<(), ChatError> {
        let json = session
            .to_json()
            .map_err(|e| ChatError::persistence_write_failed(e.to_string()))?;
        self.store.set(&self.key(), &json).await?;
        Ok(())
    }

    async fn remove(&self) {
        if let Err(e) = self.store.remove(&self.key()).await {
            warn!(persona = %self.persona_key, error = %e, "Failed to remove persisted session");
        }
    }
}

/// Dispatch and commit half of a turn, owned by its own task.
struct TurnTask {
    request: TurnRequest,
    pending: PendingTurn,
    dispatcher: ConversationDispatcher,
    mirror: SessionMirror,
    state: Arc<Mutex<ControllerState>>,
}

impl TurnTask {
    async fn run(self) -> Result<TurnOutcome, ChatError> {
        {
            let state = self.state.lock().await;
            self.mirror.persist(&state.session).await;
        }

        let result = AssertUnwindSafe(self.dispatcher.send(&self.request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(ChatError::generation_failed("model call panicked")))
            .and_then(|turn| {
                Message::ai(turn.response_text, turn.produced_image_ref).map_err(ChatError::from)
            });

        let mut state = self.state.lock().await;
        state.turn.finish();

        match result {
            Ok(reply) => {
                state.session.record_reply(reply.clone());
                self.mirror.persist(&state.session).await;

                info!(
                    persona = %self.mirror.persona_key,
                    messages = state.session.len(),
                    has_image = reply.image_ref().is_some(),
                    "Turn committed"
                );
                Ok(TurnOutcome {
                    user_message: self.pending.user_message,
                    reply,
                })
            }
            Err(err) => {
                roll_back(&mut state, self.pending);
                self.mirror.persist(&state.session).await;

                warn!(persona = %self.mirror.persona_key, error = %err, "Turn failed, rolled back");
                Err(err)
            }
        }
    }
}

/// Undoes the optimistic append of a failed turn.
///
/// Without concurrent edits the snapshot is restored exactly. If the
/// session changed in the meantime only the pending user message is
/// removed, so those edits survive.
fn roll_back(state: &mut ControllerState, pending: PendingTurn) {
    if state.revision == pending.revision {
        state.session.restore(pending.snapshot);
    } else if state.session.contains(pending.user_message.id()) {
        let _ = state.session.delete_message(pending.user_message.id());
    }
}

/// Single writer of one persona's session.
pub struct SessionController {
    persona: Persona,
    builder: TurnRequestBuilder,
    dispatcher: ConversationDispatcher,
    mirror: SessionMirror,
    state: Arc<Mutex<ControllerState>>,
}

impl SessionController {
    /// Opens the persona's session, loading it from the store if present.
    ///
    /// Missing, unreadable or malformed persisted data yields a fresh session
    /// holding only the greeting. A fresh session is not written back until
    /// its first mutation.
    pub async fn open(
        persona: Persona,
        dispatcher: ConversationDispatcher,
        store: Arc<dyn KeyValueStore>,
        builder: TurnRequestBuilder,
    ) -> Self {
        let mirror = SessionMirror {
            persona_key: persona.key.clone(),
            store,
        };
        let session = match mirror.store.get(&mirror.key()).await {
            Ok(Some(json)) => Session::from_json(&persona, &json).unwrap_or_else(|e| {
                warn!(persona = %persona.key, error = %e, "Discarding malformed persisted session");
                Session::start(&persona)
            }),
            Ok(None) => Session::start(&persona),
            Err(e) => {
                warn!(persona = %persona.key, error = %e, "Failed to read persisted session");
                Session::start(&persona)
            }
        };

        debug!(persona = %persona.key, messages = session.len(), "Session opened");

        Self {
            persona,
            builder,
            dispatcher,
            mirror,
            state: Arc::new(Mutex::new(ControllerState {
                session,
                turn: TurnState::Idle,
                preferences: TurnPreferences::default(),
                revision: 0,
            })),
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Returns a copy of the current session.
    pub async fn session(&self) -> Session {
        self.state.lock().await.session.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.turn.is_busy()
    }

    pub async fn preferences(&self) -> TurnPreferences {
        self.state.lock().await.preferences.clone()
    }

    /// Sets the language and style used by subsequent turns.
    pub async fn set_preferences(&self, language: Language, style_override: Option<String>) {
        self.state.lock().await.preferences = TurnPreferences::new(language, style_override);
    }

    /// Submits one user turn.
    ///
    /// # Errors
    ///
    /// - `Busy` if a turn is already awaiting its response (nothing changes)
    /// - `InvalidInput` if the text is blank (nothing changes)
    /// - `GenerationFailed` if the model call fails; the session is rolled
    ///   back to its state before the submit
    pub async fn submit(&self, user_text: &str) -> Result<TurnOutcome, ChatError> {
        let task = {
            let mut state = self.state.lock().await;
            if state.turn.is_busy() {
                return Err(ChatError::Busy);
            }

            let request = self
                .builder
                .build(&self.persona, &state.session, user_text, &state.preferences)?;
            let user_message = Message::user(request.user_text())?;
            state.turn.begin()?;

            let snapshot = state.session.snapshot();
            state.session.append(user_message.clone());

            TurnTask {
                request,
                pending: PendingTurn {
                    user_message,
                    snapshot,
                    revision: state.revision,
                },
                dispatcher: self.dispatcher.clone(),
                mirror: self.mirror.clone(),
                state: Arc::clone(&self.state),
            }
        };

        tokio::spawn(task.run())
            .await
            .map_err(|e| ChatError::generation_failed(format!("turn task did not complete: {e}")))?
    }

    /// Deletes one message. Allowed while a turn is in flight.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for the greeting
    /// - `MessageNotFound` if no message has this id
    pub async fn delete_message(&self, id: &MessageId) -> Result<Message, ChatError> {
        let mut state = self.state.lock().await;
        let removed = state.session.delete_message(id)?;
        state.revision += 1;
        self.mirror.persist(&state.session).await;

        debug!(persona = %self.persona.key, message_id = %id, "Message deleted");
        Ok(removed)
    }

    /// Resets the session to a single fresh greeting and drops the
    /// persisted copy.
    ///
    /// # Errors
    ///
    /// - `Busy` if a turn is in flight
    pub async fn reset_all(&self) -> Result<(), ChatError> {
        let mut state = self.state.lock().await;
        if state.turn.is_busy() {
            return Err(ChatError::Busy);
        }

        state.session.reset(&self.persona);
        state.revision += 1;
        self.mirror.remove().await;

        info!(persona = %self.persona.key, "Session reset");
        Ok(())
    }
}
