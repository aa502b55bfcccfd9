//! Mock Persona Model for testing.
//!
//! Provides a configurable mock implementation of the PersonaModel port,
//! allowing tests to run without calling a real generative model.
//!
//! # Features
//!
//! - Scripted chat, image and mood replies (consumed in order)
//! - Simulated delays for concurrency testing
//! - Error injection
//! - Call tracking and an in-flight high-water mark
//!
//! # Example
//!
//! ```ignore
//! let model = MockPersonaModel::new()
//!     .with_chat_reply(ChatOutput::text("Hi there!"))
//!     .with_delay(Duration::from_millis(50));
//!
//! let output = model.chat(input).await?;
//! assert_eq!(output.response.as_deref(), Some("Hi there!"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    ChatInput, ChatOutput, CombineImagesInput, ImageOutput, ImageToImageInput, ModelError,
    ModelInfo, PersonaModel,
};

/// Image returned when no image reply is scripted (1x1 PNG).
pub const MOCK_IMAGE_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// A recorded call to the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Chat(ChatInput),
    GenerateImage(String),
    GenerateImageFromImage(ImageToImageInput),
    CombineImages(CombineImagesInput),
    DetectMood(String),
    ComposeVoiceLine(String),
    SynthesizeSpeech(String),
}

/// Mock persona model for testing.
///
/// Configurable to return specific replies, simulate delays, or inject errors.
#[derive(Debug, Clone)]
pub struct MockPersonaModel {
    chat_replies: Arc<Mutex<VecDeque<Result<ChatOutput, ModelError>>>>,
    image_replies: Arc<Mutex<VecDeque<Result<ImageOutput, ModelError>>>>,
    mood_replies: Arc<Mutex<VecDeque<Result<String, ModelError>>>>,
    voice_line: Option<String>,
    speech_pcm: Vec<u8>,
    info: ModelInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockPersonaModel {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tracks concurrent calls for the lifetime of one request.
struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, high_water: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        high_water.fetch_max(now, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockPersonaModel {
    /// Creates a new mock model with default settings.
    pub fn new() -> Self {
        Self {
            chat_replies: Arc::new(Mutex::new(VecDeque::new())),
            image_replies: Arc::new(Mutex::new(VecDeque::new())),
            mood_replies: Arc::new(Mutex::new(VecDeque::new())),
            voice_line: Some("You are doing great, keep going.".to_string()),
            // 10ms of silence at 24 kHz, 16-bit mono.
            speech_pcm: vec![0u8; 480],
            info: ModelInfo::new("mock", "mock-persona-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Adds a chat reply to the queue.
    pub fn with_chat_reply(self, output: ChatOutput) -> Self {
        lock(&self.chat_replies).push_back(Ok(output));
        self
    }

    /// Adds a chat error to the queue.
    pub fn with_chat_error(self, error: ModelError) -> Self {
        lock(&self.chat_replies).push_back(Err(error));
        self
    }

    /// Adds an image reply to the queue (shared by all image calls).
    pub fn with_image_reply(self, output: ImageOutput) -> Self {
        lock(&self.image_replies).push_back(Ok(output));
        self
    }

    /// Adds an image error to the queue.
    pub fn with_image_error(self, error: ModelError) -> Self {
        lock(&self.image_replies).push_back(Err(error));
        self
    }

    /// Adds a raw mood label to the queue.
    pub fn with_mood(self, label: impl Into<String>) -> Self {
        lock(&self.mood_replies).push_back(Ok(label.into()));
        self
    }

    /// Sets the voice line text. `None` simulates a model that returns no text.
    pub fn with_voice_line(mut self, line: Option<String>) -> Self {
        self.voice_line = line;
        self
    }

    /// Sets the PCM returned by speech synthesis.
    pub fn with_speech_pcm(mut self, pcm: Vec<u8>) -> Self {
        self.speech_pcm = pcm;
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the model info.
    pub fn with_model_info(mut self, info: ModelInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this model.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Returns the recorded chat inputs.
    pub fn chat_inputs(&self) -> Vec<ChatInput> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                MockCall::Chat(input) => Some(input.clone()),
                _ => None,
            })
            .collect()
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    async fn enter(&self, call: MockCall) -> InFlight<'_> {
        lock(&self.calls).push(call);
        let guard = InFlight::enter(&self.in_flight, &self.max_in_flight);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        guard
    }

    fn next_image(&self) -> Result<ImageOutput, ModelError> {
        lock(&self.image_replies)
            .pop_front()
            .unwrap_or_else(|| Ok(ImageOutput::image(MOCK_IMAGE_DATA_URI)))
    }
}

#[async_trait]
impl PersonaModel for MockPersonaModel {
    async fn chat(&self, input: ChatInput) -> Result<ChatOutput, ModelError> {
        let _guard = self.enter(MockCall::Chat(input)).await;
        lock(&self.chat_replies)
            .pop_front()
            .unwrap_or_else(|| Ok(ChatOutput::text("Mock response")))
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, ModelError> {
        let _guard = self.enter(MockCall::GenerateImage(prompt.to_string())).await;
        self.next_image()
    }

    async fn generate_image_from_image(
        &self,
        input: ImageToImageInput,
    ) -> Result<ImageOutput, ModelError> {
        let _guard = self.enter(MockCall::GenerateImageFromImage(input)).await;
        self.next_image()
    }

    async fn combine_images(&self, input: CombineImagesInput) -> Result<ImageOutput, ModelError> {
        let _guard = self.enter(MockCall::CombineImages(input)).await;
        self.next_image()
    }

    async fn detect_mood(&self, prompt: &str) -> Result<String, ModelError> {
        let _guard = self.enter(MockCall::DetectMood(prompt.to_string())).await;
        lock(&self.mood_replies)
            .pop_front()
            .unwrap_or_else(|| Ok("Neutral".to_string()))
    }

    async fn compose_voice_line(&self, prompt: &str) -> Result<Option<String>, ModelError> {
        let _guard = self.enter(MockCall::ComposeVoiceLine(prompt.to_string())).await;
        Ok(self.voice_line.clone())
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ModelError> {
        let _guard = self.enter(MockCall::SynthesizeSpeech(text.to_string())).await;
        Ok(self.speech_pcm.clone())
    }

    fn model_info(&self) -> ModelInfo {
        self.info.clone()
    }
}
