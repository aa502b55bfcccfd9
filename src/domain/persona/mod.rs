//! Persona domain module.
//!
//! Fixed conversational identities and the prompt vocabulary they map to.

mod registry;
mod role;

pub use registry::{Persona, PersonaOverride, PersonaRegistry};
pub use role::{Language, PromptRole};
