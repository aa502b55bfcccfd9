//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Persona model implementations (mock)
//! - `storage` - Key/value stores (in-memory, file)

pub mod ai;
pub mod storage;

pub use ai::MockPersonaModel;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
