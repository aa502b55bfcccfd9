//! Persona Model Adapters.
//!
//! Implementations of the PersonaModel port.
//!
//! ## Available Adapters
//!
//! - `MockPersonaModel` - Configurable mock for testing

mod mock_model;

pub use mock_model::{MockCall, MockPersonaModel, MOCK_IMAGE_DATA_URI};
