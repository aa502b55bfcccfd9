//! Mood detected from a user message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Neutral,
    Flirty,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Neutral => "Neutral",
            Mood::Flirty => "Flirty",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "angry" => Ok(Mood::Angry),
            "neutral" => Ok(Mood::Neutral),
            "flirty" => Ok(Mood::Flirty),
            other => Err(ValidationError::invalid_format(
                "mood",
                format!("unknown mood '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_labels() {
        assert_eq!("Flirty".parse::<Mood>().unwrap(), Mood::Flirty);
        assert_eq!(" sad\n".parse::<Mood>().unwrap(), Mood::Sad);
    }

    #[test]
    fn rejects_unknown_mood() {
        assert!("Bored".parse::<Mood>().is_err());
    }
}
