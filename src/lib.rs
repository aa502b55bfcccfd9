//! Persona Chat - conversation orchestration for AI personas
//!
//! This crate assembles persona turn requests, dispatches them to a
//! generative model, and keeps each persona's local session consistent:
//! optimistic appends with rollback on failure, message deletion, and image
//! continuity across turns.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
