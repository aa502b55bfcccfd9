//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, errors)
//! - `persona` - Persona registry, prompt roles, languages
//! - `conversation` - Sessions, messages, turn requests, prompt templates
//! - `media` - Data URIs and WAV encoding for generated media

pub mod conversation;
pub mod foundation;
pub mod media;
pub mod persona;
