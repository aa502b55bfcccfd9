//! Persona Model Port - Interface for the generative model.
//!
//! This port abstracts every outbound call to the generative model: persona
//! chat, image generation and editing, mood detection, and speech synthesis.
//! The conversation handlers depend only on this trait, never on a concrete
//! provider.
//!
//! # Design
//!
//! - One request in, one response out. No retries and no streaming.
//! - All images cross the boundary as data URIs (`data:<mime>;base64,<data>`).
//! - Outputs are optional where the model may legitimately return nothing;
//!   the dispatcher decides what counts as a failure.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoModel;
//!
//! #[async_trait]
//! impl PersonaModel for EchoModel {
//!     async fn chat(&self, input: ChatInput) -> Result<ChatOutput, ModelError> {
//!         Ok(ChatOutput::text(input.message))
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::TurnRequest;
use crate::domain::foundation::ChatError;
use crate::domain::persona::{Language, PromptRole};

/// Port for generative model interactions.
#[async_trait]
pub trait PersonaModel: Send + Sync {
    /// Generates the persona's reply to one chat turn.
    async fn chat(&self, input: ChatInput) -> Result<ChatOutput, ModelError>;

    /// Generates an image from a text prompt.
    async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, ModelError>;

    /// Generates an image guided by a source image and a text prompt.
    async fn generate_image_from_image(
        &self,
        input: ImageToImageInput,
    ) -> Result<ImageOutput, ModelError>;

    /// Combines the subjects of two images into one scene.
    async fn combine_images(&self, input: CombineImagesInput) -> Result<ImageOutput, ModelError>;

    /// Classifies the mood of a message. Returns the raw label.
    async fn detect_mood(&self, prompt: &str) -> Result<String, ModelError>;

    /// Writes a short spoken line. `None` when the model produced no text.
    async fn compose_voice_line(&self, prompt: &str) -> Result<Option<String>, ModelError>;

    /// Synthesizes speech as raw 16-bit little-endian PCM, mono, 24 kHz.
    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ModelError>;

    /// Get model information (provider name, model identifier).
    fn model_info(&self) -> ModelInfo;
}

/// Input of one chat turn, in the shape the model prompt expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub role: PromptRole,
    pub message: String,
    pub chat_history: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_image_data_uri: Option<String>,
    /// Fully rendered prompt text.
    pub prompt: String,
}

impl From<&TurnRequest> for ChatInput {
    fn from(request: &TurnRequest) -> Self {
        Self {
            role: request.prompt_role(),
            message: request.user_text().to_string(),
            chat_history: request.chat_history(),
            language: request.language(),
            conversation_style: request.style_override().map(str::to_string),
            last_image_data_uri: request.context_image_ref().map(str::to_string),
            prompt: request.prompt(),
        }
    }
}

/// Model reply to a chat turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
}

impl ChatOutput {
    /// Creates a text-only reply.
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            image_data_uri: None,
        }
    }

    /// Attaches a generated image.
    pub fn with_image(mut self, data_uri: impl Into<String>) -> Self {
        self.image_data_uri = Some(data_uri.into());
        self
    }
}

/// Image generation guided by a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageToImageInput {
    pub prompt: String,
    pub image_data_uri: String,
}

/// Two-image composition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineImagesInput {
    pub prompt: String,
    pub image1_data_uri: String,
    pub image2_data_uri: String,
}

/// Result of an image call. `None` when the model returned no media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
}

impl ImageOutput {
    pub fn image(data_uri: impl Into<String>) -> Self {
        Self {
            image_data_uri: Some(data_uri.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Model provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Provider name (e.g., "googleai", "mock").
    pub name: String,
    /// Chat model identifier.
    pub model: String,
    /// Whether the provider can return images.
    pub supports_images: bool,
    /// Whether the provider can synthesize speech.
    pub supports_speech: bool,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            supports_images: true,
            supports_speech: true,
        }
    }

    pub fn with_images(mut self, supports: bool) -> Self {
        self.supports_images = supports;
        self
    }

    pub fn with_speech(mut self, supports: bool) -> Self {
        self.supports_speech = supports;
        self
    }
}

/// Model provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Content was blocked by the provider's safety filter.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ModelError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

impl From<ModelError> for ChatError {
    fn from(err: ModelError) -> Self {
        ChatError::generation_failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Session, TurnPreferences, TurnRequestBuilder};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::persona::PersonaRegistry;

    #[test]
    fn chat_input_serializes_camel_case() {
        let input = ChatInput {
            role: PromptRole::Brother,
            message: "Hello".to_string(),
            chat_history: "AI: Hey!".to_string(),
            language: Language::English,
            conversation_style: None,
            last_image_data_uri: Some("data:image/png;base64,AAA".to_string()),
            prompt: "p".to_string(),
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["role"], "Brother");
        assert_eq!(json["chatHistory"], "AI: Hey!");
        assert_eq!(json["lastImageDataUri"], "data:image/png;base64,AAA");
        assert!(json.get("conversationStyle").is_none());
    }

    #[test]
    fn chat_output_tolerates_missing_fields() {
        let output: ChatOutput = serde_json::from_str("{}").unwrap();
        assert!(output.response.is_none());
        assert!(output.image_data_uri.is_none());

        let output: ChatOutput =
            serde_json::from_str(r#"{"response":"Hi","imageDataUri":"data:image/png;base64,AAA"}"#)
                .unwrap();
        assert_eq!(output, ChatOutput::text("Hi").with_image("data:image/png;base64,AAA"));
    }

    #[test]
    fn chat_input_is_built_from_turn_request() {
        let registry = PersonaRegistry::builtin();
        let persona = registry.lookup("mother").unwrap();
        let session = Session::start(persona);
        let prefs = TurnPreferences::new(Language::Hindi, Some("calm".to_string()));
        let request = TurnRequestBuilder::default()
            .build(persona, &session, "hello", &prefs)
            .unwrap();

        let input = ChatInput::from(&request);

        assert_eq!(input.role, PromptRole::Mother);
        assert_eq!(input.message, "hello");
        assert_eq!(input.language, Language::Hindi);
        assert_eq!(input.conversation_style.as_deref(), Some("calm"));
        assert!(input.chat_history.starts_with("AI: "));
        assert!(input.prompt.ends_with("Response:"));
    }

    #[test]
    fn model_errors_become_generation_failures() {
        let err: ChatError = ModelError::network("connection reset").into();
        assert_eq!(err.code(), ErrorCode::GenerationFailed);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn model_info_builder_works() {
        let info = ModelInfo::new("mock", "mock-1").with_speech(false);
        assert!(info.supports_images);
        assert!(!info.supports_speech);
    }
}
