//! Assistant trait: the abstraction over the external natural-language service.
//!
//! An Assistant takes one assembled prompt and returns one normalized text
//! answer. It is opaque: no streaming, no tool calls, no conversation state.
//!
//! Implementations: HTTP relay (`dbtchat-assistant`), scripted doubles in tests.

use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request body sent to the assistant relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantRequest {
    /// The fully assembled prompt
    pub prompt: String,
}

/// Raw response returned by the assistant relay.
///
/// Mirrors the exit status and output streams of the assistant process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub returncode: i64,

    #[serde(default)]
    pub stdout: String,

    #[serde(default)]
    pub stderr: String,
}

/// The core Assistant trait.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Human-readable name (used in logs).
    fn name(&self) -> &str;

    /// Send one prompt and return the normalized answer text.
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError>;
}
