//! # dbtchat Core
//!
//! Domain types, traits, and error definitions for the dbtchat service.
//! This crate has **no framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The external assistant is defined as a trait here; the HTTP relay lives in
//! `dbtchat-assistant`. This enables:
//! - Testing the chat pipeline with scripted doubles
//! - Clean dependency graph (all crates depend inward on core)

pub mod assistant;
pub mod error;
pub mod manifest;
pub mod message;

// Re-export key types at crate root for ergonomics
pub use assistant::{Assistant, AssistantRequest, AssistantResponse};
pub use error::{Error, GatewayError, ManifestError, Result};
pub use manifest::{Manifest, ModelNode, ReducedManifest, MODEL_RESOURCE_TYPE};
pub use message::{Role, Turn};
