//! Persona registry - static mapping from persona key to identity.
//!
//! The registry is the only place [`PromptRole`] values are minted, so the
//! turn request builder never sees a role outside the closed enum.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::PromptRole;
use crate::domain::foundation::{ChatError, PersonaKey};

const PLACEHOLDER_AVATAR: &str = "https://placehold.co/100x100.png";

/// A conversational identity with its own voice.
///
/// # Invariants
///
/// - `key` is unique across the registry
/// - `prompt_role` is fixed; overrides only touch display data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub key: PersonaKey,
    pub display_name: String,
    pub prompt_role: PromptRole,
    pub initial_message: String,
    pub avatar_ref: String,
}

impl Persona {
    fn builtin(
        key: &'static str,
        display_name: &str,
        prompt_role: PromptRole,
        initial_message: &str,
    ) -> Self {
        Self {
            key: PersonaKey::from_static(key),
            display_name: display_name.to_string(),
            prompt_role,
            initial_message: initial_message.to_string(),
            avatar_ref: PLACEHOLDER_AVATAR.to_string(),
        }
    }
}

/// User-edited display data for a persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaOverride {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_ref: Option<String>,
}

static BUILTIN_PERSONAS: Lazy<Vec<Persona>> = Lazy::new(|| {
    vec![
        Persona::builtin(
            "brother",
            "Your Brother",
            PromptRole::Brother,
            "What's up? Need to talk about something or just chill?",
        ),
        Persona::builtin(
            "friend",
            "Your Friend",
            PromptRole::Friend,
            "Hey buddy! How's it going? Anything new and exciting happening?",
        ),
        Persona::builtin(
            "girlfriend",
            "Your Girlfriend ❤️",
            PromptRole::Girlfriend,
            "Heyy! I was just thinking about you. How was your day, Ji?",
        ),
        Persona::builtin(
            "mother",
            "Your Mother",
            PromptRole::Mother,
            "Hi beta, have you eaten? I was just worried about you. Everything okay?",
        ),
        Persona::builtin(
            "father",
            "Your Father",
            PromptRole::Father,
            "Son, how are things? Remember to stand tall. Let's talk.",
        ),
    ]
});

/// Read-only lookup of personas by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// Returns the registry of the five built-in personas.
    pub fn builtin() -> Self {
        Self {
            personas: BUILTIN_PERSONAS.clone(),
        }
    }

    /// Looks up a persona by key.
    ///
    /// # Errors
    ///
    /// - `PersonaNotFound` if no persona has this key
    pub fn lookup(&self, key: &str) -> Result<&Persona, ChatError> {
        self.personas
            .iter()
            .find(|p| p.key.as_str() == key)
            .ok_or_else(|| ChatError::PersonaNotFound(key.to_string()))
    }

    /// Applies user-edited display names and avatars.
    ///
    /// Overrides for unknown keys are ignored. Blank values keep the default.
    pub fn with_overrides(mut self, overrides: &HashMap<String, PersonaOverride>) -> Self {
        for persona in &mut self.personas {
            let Some(edit) = overrides.get(persona.key.as_str()) else {
                continue;
            };
            if let Some(name) = edit.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
                persona.display_name = name.to_string();
            }
            if let Some(avatar) = edit.avatar_ref.as_deref().filter(|a| !a.trim().is_empty()) {
                persona.avatar_ref = avatar.to_string();
            }
        }
        self
    }

    /// Returns all personas in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// Returns all persona keys in registry order.
    pub fn keys(&self) -> Vec<&PersonaKey> {
        self.personas.iter().map(|p| &p.key).collect()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_registry_has_one_persona_per_role() {
        let registry = PersonaRegistry::builtin();
        let roles: HashSet<_> = registry.iter().map(|p| p.prompt_role).collect();
        assert_eq!(roles.len(), PromptRole::all().len());
    }

    #[test]
    fn builtin_keys_are_unique() {
        let registry = PersonaRegistry::builtin();
        let keys: HashSet<_> = registry.keys().into_iter().collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn lookup_finds_known_persona() {
        let registry = PersonaRegistry::builtin();
        let mother = registry.lookup("mother").unwrap();
        assert_eq!(mother.prompt_role, PromptRole::Mother);
        assert!(mother.initial_message.starts_with("Hi beta"));
    }

    #[test]
    fn lookup_unknown_key_signals_persona_not_found() {
        let registry = PersonaRegistry::builtin();
        let err = registry.lookup("uncle").unwrap_err();
        assert_eq!(err, ChatError::PersonaNotFound("uncle".to_string()));
    }

    #[test]
    fn overrides_change_display_data_only() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "friend".to_string(),
            PersonaOverride {
                display_name: Some("Rahul".to_string()),
                avatar_ref: Some("data:image/png;base64,AAA".to_string()),
            },
        );
        overrides.insert("uncle".to_string(), PersonaOverride::default());

        let registry = PersonaRegistry::builtin().with_overrides(&overrides);
        let friend = registry.lookup("friend").unwrap();

        assert_eq!(friend.display_name, "Rahul");
        assert_eq!(friend.avatar_ref, "data:image/png;base64,AAA");
        assert_eq!(friend.prompt_role, PromptRole::Friend);
        assert!(registry.lookup("uncle").is_err());
    }

    #[test]
    fn blank_override_keeps_default_name() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "brother".to_string(),
            PersonaOverride {
                display_name: Some("   ".to_string()),
                avatar_ref: None,
            },
        );

        let registry = PersonaRegistry::builtin().with_overrides(&overrides);
        assert_eq!(registry.lookup("brother").unwrap().display_name, "Your Brother");
    }
}
