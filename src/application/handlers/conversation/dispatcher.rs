//! Conversation dispatcher.
//!
//! Sends one turn request to the persona model and validates the reply.
//! Also runs the media flows: single images, the five-way image-variant
//! fan-out, image composition, mood detection and voice notes.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::conversation::templates::{
    combine_images_prompt, mood_prompt, variant_prompt, voice_line_prompt,
};
use crate::domain::conversation::{Mood, TurnRequest, TurnResult};
use crate::domain::foundation::ChatError;
use crate::domain::media::{encode_wav, DataUri, WavFormat};
use crate::ports::{
    ChatInput, CombineImagesInput, ImageOutput, ImageToImageInput, ModelInfo, PersonaModel,
};

/// Number of images produced by [`ConversationDispatcher::generate_variants`].
pub const VARIANT_COUNT: usize = 5;

/// Line spoken when the model writes no voice-note text.
pub const FALLBACK_VOICE_LINE: &str = "Everything will be alright.";

/// Dispatches turns and media requests to the persona model.
///
/// Every operation makes its model call(s) exactly once: no retries, no
/// timeouts beyond what the model adapter imposes.
#[derive(Clone)]
pub struct ConversationDispatcher {
    model: Arc<dyn PersonaModel>,
}

impl ConversationDispatcher {
    pub fn new(model: Arc<dyn PersonaModel>) -> Self {
        Self { model }
    }

    pub fn model_info(&self) -> ModelInfo {
        self.model.model_info()
    }

    /// Sends one chat turn.
    ///
    /// # Errors
    ///
    /// - `GenerationFailed` if the model errors, returns no text, or returns
    ///   an image that is not an image data URI
    pub async fn send(&self, request: &TurnRequest) -> Result<TurnResult, ChatError> {
        debug!(
            role = %request.prompt_role(),
            language = %request.language(),
            history_len = request.history_window().len(),
            has_context_image = request.context_image_ref().is_some(),
            "Dispatching chat turn"
        );

        let output = self.model.chat(ChatInput::from(request)).await?;

        let response_text = output
            .response
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ChatError::generation_failed("model returned no response text"))?;

        let produced_image_ref = output
            .image_data_uri
            .map(|uri| validate_image(&uri))
            .transpose()?;

        Ok(TurnResult {
            response_text,
            produced_image_ref,
        })
    }

    /// Generates one image from a text prompt.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, ChatError> {
        let prompt = require_text("prompt", prompt)?;
        let output = self.model.generate_image(prompt).await?;
        require_image(output, "image generation failed")
    }

    /// Generates [`VARIANT_COUNT`] restyled images of the person in `source_image`.
    ///
    /// All branches run concurrently. The call succeeds only if every branch
    /// produced a valid image; otherwise nothing is returned.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `style_text` is blank or `source_image` is not an
    ///   image data URI
    /// - `GenerationFailed` if any branch errors or yields no image
    pub async fn generate_variants(
        &self,
        source_image: &str,
        style_text: &str,
    ) -> Result<Vec<String>, ChatError> {
        let style = require_text("style_text", style_text)?;
        let source = require_source_image("source_image", source_image)?;

        let branches = (1..=VARIANT_COUNT).map(|index| {
            let input = ImageToImageInput {
                prompt: variant_prompt(style, index, VARIANT_COUNT),
                image_data_uri: source.as_str().to_string(),
            };
            self.model.generate_image_from_image(input)
        });

        let results = futures::future::join_all(branches).await;

        let mut images = Vec::with_capacity(VARIANT_COUNT);
        for (index, result) in results.into_iter().enumerate() {
            let image = result
                .map_err(ChatError::from)
                .and_then(|output| require_image(output, "one or more image generations failed"));
            match image {
                Ok(uri) => images.push(uri),
                Err(e) => {
                    warn!(branch = index + 1, error = %e, "Image variant failed");
                    return Err(ChatError::generation_failed(
                        "one or more image generations failed",
                    ));
                }
            }
        }

        Ok(images)
    }

    /// Combines the subjects of two images into a scene described by `prompt`.
    pub async fn combine_images(
        &self,
        prompt: &str,
        first_image: &str,
        second_image: &str,
    ) -> Result<String, ChatError> {
        let scene = require_text("prompt", prompt)?;
        require_source_image("first_image", first_image)?;
        require_source_image("second_image", second_image)?;

        let input = CombineImagesInput {
            prompt: combine_images_prompt(scene),
            image1_data_uri: first_image.to_string(),
            image2_data_uri: second_image.to_string(),
        };
        let output = self.model.combine_images(input).await?;
        require_image(output, "image combination failed")
    }

    /// Classifies the mood of a user message.
    pub async fn detect_mood(&self, text: &str) -> Result<Mood, ChatError> {
        let text = require_text("text", text)?;
        let label = self.model.detect_mood(&mood_prompt(text)).await?;
        label
            .parse::<Mood>()
            .map_err(|e| ChatError::generation_failed(e.to_string()))
    }

    /// Produces an encouraging voice note for `mood` as a `data:audio/wav` URI.
    pub async fn voice_note(&self, mood: Mood) -> Result<String, ChatError> {
        let line = self
            .model
            .compose_voice_line(&voice_line_prompt(mood.as_str()))
            .await?
            .filter(|line| !line.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_VOICE_LINE.to_string());

        debug!(mood = %mood, "Synthesizing voice note");
        let pcm = self.model.synthesize_speech(&line).await?;
        if pcm.is_empty() {
            return Err(ChatError::generation_failed("no audio returned"));
        }

        let wav = encode_wav(&pcm, WavFormat::speech())
            .map_err(|e| ChatError::generation_failed(e.to_string()))?;
        Ok(DataUri::from_bytes("audio/wav", &wav).into_string())
    }
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ChatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ChatError::invalid_input(format!("{} cannot be empty", field)));
    }
    Ok(trimmed)
}

/// Checks a caller-supplied image before it is sent to the model.
fn require_source_image(field: &str, uri: &str) -> Result<DataUri, ChatError> {
    let parsed =
        DataUri::parse(uri).map_err(|e| ChatError::invalid_input(format!("{}: {}", field, e)))?;
    if !parsed.is_image() {
        return Err(ChatError::invalid_input(format!(
            "{} has non-image MIME type '{}'",
            field,
            parsed.mime_type()
        )));
    }
    Ok(parsed)
}

fn validate_image(uri: &str) -> Result<String, ChatError> {
    let parsed = DataUri::parse(uri)
        .map_err(|e| ChatError::generation_failed(format!("produced image is invalid: {}", e)))?;
    if !parsed.is_image() {
        return Err(ChatError::generation_failed(format!(
            "produced media is not an image: {}",
            parsed.mime_type()
        )));
    }
    Ok(parsed.into_string())
}

fn require_image(output: ImageOutput, reason: &str) -> Result<String, ChatError> {
    let uri = output
        .image_data_uri
        .ok_or_else(|| ChatError::generation_failed(reason))?;
    validate_image(&uri)
}
