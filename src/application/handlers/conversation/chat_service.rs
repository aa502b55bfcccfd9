//! Chat service - entry point for persona conversations.
//!
//! Holds one [`SessionController`] per persona, created on first entry and
//! kept for the lifetime of the service, so navigating between personas
//! never loses an in-flight turn or its session.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ConversationDispatcher, SessionController};
use crate::application::handlers::settings::{SettingsReader, UserProfile};
use crate::config::{AppConfig, ValidationError};
use crate::domain::conversation::TurnRequestBuilder;
use crate::domain::foundation::{ChatError, PersonaKey};
use crate::domain::persona::{Persona, PersonaRegistry};
use crate::ports::{KeyValueStore, PersonaModel};

/// Registry of per-persona session controllers.
pub struct ChatService {
    registry: PersonaRegistry,
    dispatcher: ConversationDispatcher,
    store: Arc<dyn KeyValueStore>,
    settings: SettingsReader,
    builder: TurnRequestBuilder,
    controllers: Mutex<HashMap<PersonaKey, Arc<SessionController>>>,
}

impl ChatService {
    /// Creates a service over the built-in personas.
    pub fn new(model: Arc<dyn PersonaModel>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            registry: PersonaRegistry::builtin(),
            dispatcher: ConversationDispatcher::new(model),
            settings: SettingsReader::new(Arc::clone(&store)),
            store,
            builder: TurnRequestBuilder::default(),
            controllers: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a service from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the configuration is invalid.
    pub fn from_config(
        config: &AppConfig,
        model: Arc<dyn PersonaModel>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let store = config.storage.build_store()?;
        let settings = SettingsReader::new(Arc::clone(&store))
            .with_default_language(config.chat.default_language);

        Ok(Self {
            registry: PersonaRegistry::builtin(),
            dispatcher: ConversationDispatcher::new(model),
            settings,
            store,
            builder: TurnRequestBuilder::new(config.chat.history_window),
            controllers: Mutex::new(HashMap::new()),
        })
    }

    /// Sets how many prior messages each turn carries, clamped to 1..=10.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.builder = TurnRequestBuilder::new(limit);
        self
    }

    /// Personas with the user's display overrides applied.
    pub async fn personas(&self) -> Vec<Persona> {
        self.effective_registry().await.iter().cloned().collect()
    }

    /// Opens the conversation with a persona.
    ///
    /// The first call for a persona loads its session; later calls return
    /// the same controller. Each call refreshes language and style from the
    /// stored settings.
    ///
    /// # Errors
    ///
    /// - `PersonaNotFound` if no persona has this key
    pub async fn open(&self, key: &str) -> Result<Arc<SessionController>, ChatError> {
        let registry = self.effective_registry().await;
        let persona = registry.lookup(key)?.clone();

        let language = self.settings.language().await;
        let style = self.settings.style_for(persona.key.as_str()).await;

        let controller = {
            let mut controllers = self.controllers.lock().await;
            match controllers.get(&persona.key) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let controller = Arc::new(
                        SessionController::open(
                            persona.clone(),
                            self.dispatcher.clone(),
                            Arc::clone(&self.store),
                            self.builder,
                        )
                        .await,
                    );
                    controllers.insert(persona.key.clone(), Arc::clone(&controller));
                    controller
                }
            }
        };

        controller.set_preferences(language, style).await;
        debug!(persona = %persona.key, language = %language, "Conversation opened");
        Ok(controller)
    }

    /// Media flows (image variants, composition, mood, voice notes).
    pub fn dispatcher(&self) -> &ConversationDispatcher {
        &self.dispatcher
    }

    pub async fn profile(&self) -> UserProfile {
        self.settings.profile().await
    }

    async fn effective_registry(&self) -> PersonaRegistry {
        let overrides = self.settings.persona_overrides().await;
        self.registry.clone().with_overrides(&overrides)
    }
}
