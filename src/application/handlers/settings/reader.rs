//! SettingsReader - Tolerant reads of user settings from the local store.
//!
//! Settings are edited elsewhere; this module only reads them. Absent values
//! fall back to defaults. Malformed values are logged and also defaulted, so
//! a corrupt settings entry never blocks a conversation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::persona::{Language, PersonaOverride};
use crate::ports::{KeyValueStore, StorageKey};

const DEFAULT_PROFILE_NAME: &str = "You";

/// The local user's display identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default = "default_profile_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE_NAME.to_string()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: default_profile_name(),
            avatar_ref: None,
        }
    }
}

/// Reader for the settings keys of the local store.
#[derive(Clone)]
pub struct SettingsReader {
    store: Arc<dyn KeyValueStore>,
    default_language: Language,
}

impl SettingsReader {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            default_language: Language::default(),
        }
    }

    /// Sets the language used when none is stored.
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Preferred response language.
    ///
    /// Stored as a raw name (`Hindi`); a JSON-quoted name is accepted too.
    pub async fn language(&self) -> Language {
        let Some(raw) = self.read_raw(&StorageKey::LanguagePreference).await else {
            return self.default_language;
        };
        raw.trim()
            .trim_matches('"')
            .parse::<Language>()
            .unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring unknown language preference");
                self.default_language
            })
    }

    /// Per-persona conversation styles keyed by persona key.
    pub async fn persona_styles(&self) -> HashMap<String, String> {
        self.read_json(&StorageKey::PersonaStyles).await.unwrap_or_default()
    }

    /// The style for one persona, if set and not blank.
    pub async fn style_for(&self, persona_key: &str) -> Option<String> {
        self.persona_styles()
            .await
            .remove(persona_key)
            .filter(|style| !style.trim().is_empty())
    }

    /// Display overrides keyed by persona key.
    pub async fn persona_overrides(&self) -> HashMap<String, PersonaOverride> {
        self.read_json(&StorageKey::PersonaOverrides)
            .await
            .unwrap_or_default()
    }

    pub async fn profile(&self) -> UserProfile {
        let mut profile: UserProfile = self.read_json(&StorageKey::Profile).await.unwrap_or_default();
        if profile.name.trim().is_empty() {
            profile.name = default_profile_name();
        }
        profile
    }

    async fn read_raw(&self, key: &StorageKey) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read setting");
                None
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &StorageKey) -> Option<T> {
        let raw = self.read_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring malformed setting");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryKeyValueStore;

    async fn reader_with(entries: &[(StorageKey, &str)]) -> SettingsReader {
        let store = InMemoryKeyValueStore::new();
        for (key, value) in entries {
            store.insert_raw(key, *value).await;
        }
        SettingsReader::new(Arc::new(store))
    }

    mod language {
        use super::*;

        #[tokio::test]
        async fn defaults_to_english() {
            let reader = reader_with(&[]).await;
            assert_eq!(reader.language().await, Language::English);
        }

        #[tokio::test]
        async fn reads_raw_and_quoted_names() {
            let raw = reader_with(&[(StorageKey::LanguagePreference, "Hindi")]).await;
            let quoted = reader_with(&[(StorageKey::LanguagePreference, "\"Hinglish\"")]).await;

            assert_eq!(raw.language().await, Language::Hindi);
            assert_eq!(quoted.language().await, Language::Hinglish);
        }

        #[tokio::test]
        async fn unknown_value_falls_back_to_default() {
            let reader = reader_with(&[(StorageKey::LanguagePreference, "Klingon")])
                .await
                .with_default_language(Language::Hindi);

            assert_eq!(reader.language().await, Language::Hindi);
        }
    }

    mod styles {
        use super::*;

        #[tokio::test]
        async fn reads_style_for_persona() {
            let reader = reader_with(&[(
                StorageKey::PersonaStyles,
                r#"{"brother":"sarcastic","friend":"  "}"#,
            )])
            .await;

            assert_eq!(reader.style_for("brother").await.as_deref(), Some("sarcastic"));
            assert!(reader.style_for("friend").await.is_none());
            assert!(reader.style_for("mother").await.is_none());
        }

        #[tokio::test]
        async fn malformed_styles_are_ignored() {
            let reader = reader_with(&[(StorageKey::PersonaStyles, "[1,2")]).await;
            assert!(reader.persona_styles().await.is_empty());
        }
    }

    mod overrides {
        use super::*;

        #[tokio::test]
        async fn reads_partial_overrides() {
            let reader = reader_with(&[(
                StorageKey::PersonaOverrides,
                r#"{"mother":{"displayName":"Mummy"}}"#,
            )])
            .await;

            let overrides = reader.persona_overrides().await;
            assert_eq!(overrides["mother"].display_name.as_deref(), Some("Mummy"));
            assert!(overrides["mother"].avatar_ref.is_none());
        }
    }

    mod profile {
        use super::*;

        #[tokio::test]
        async fn defaults_name_to_you() {
            let reader = reader_with(&[]).await;
            assert_eq!(reader.profile().await.name, "You");
        }

        #[tokio::test]
        async fn reads_stored_profile() {
            let reader = reader_with(&[(
                StorageKey::Profile,
                r#"{"name":"Asha","avatarRef":"data:image/png;base64,AAA"}"#,
            )])
            .await;

            let profile = reader.profile().await;
            assert_eq!(profile.name, "Asha");
            assert_eq!(profile.avatar_ref.as_deref(), Some("data:image/png;base64,AAA"));
        }

        #[tokio::test]
        async fn blank_name_becomes_default() {
            let reader = reader_with(&[(StorageKey::Profile, r#"{"name":" "}"#)]).await;
            assert_eq!(reader.profile().await.name, "You");
        }
    }
}
