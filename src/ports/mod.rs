//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PersonaModel` - Generative model (chat, images, mood, speech)
//! - `KeyValueStore` - Durable local mirror of sessions and settings

mod key_value_store;
mod persona_model;

pub use key_value_store::{KeyValueStore, StorageError, StorageKey};
pub use persona_model::{
    ChatInput, ChatOutput, CombineImagesInput, ImageOutput, ImageToImageInput, ModelError,
    ModelInfo, PersonaModel,
};
