//! PromptRole and Language enums consumed by the turn request builder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The closed set of persona roles understood by the model prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptRole {
    Brother,
    Friend,
    Girlfriend,
    Mother,
    Father,
}

impl PromptRole {
    /// Returns all roles in registry order.
    pub fn all() -> &'static [PromptRole] {
        &[
            PromptRole::Brother,
            PromptRole::Friend,
            PromptRole::Girlfriend,
            PromptRole::Mother,
            PromptRole::Father,
        ]
    }

    /// Returns the role name as used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptRole::Brother => "Brother",
            PromptRole::Friend => "Friend",
            PromptRole::Girlfriend => "Girlfriend",
            PromptRole::Mother => "Mother",
            PromptRole::Father => "Father",
        }
    }
}

impl fmt::Display for PromptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language the persona must answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    /// Natural mix of Hindi and English.
    Hinglish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Hinglish => "Hinglish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(Language::English),
            "hindi" => Ok(Language::Hindi),
            "hinglish" => Ok(Language::Hinglish),
            other => Err(ValidationError::invalid_format(
                "language",
                format!("unsupported language '{}'", other),
            )),
        }
    }
}
