//! HTTP relay assistant.
//!
//! Posts `{"prompt": ...}` to a local relay that runs the assistant process
//! and answers with `{"returncode", "stdout", "stderr"}`. One request per
//! prompt, no retries.

use crate::normalize::normalize_output;
use async_trait::async_trait;
use dbtchat_config::AssistantConfig;
use dbtchat_core::assistant::{Assistant, AssistantRequest, AssistantResponse};
use dbtchat_core::error::{Error, GatewayError};
use std::time::Duration;
use tracing::{debug, warn};

/// Stderr placeholder when the assistant exits non-zero without output.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// An assistant reached over HTTP.
pub struct HttpAssistant {
    endpoint_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpAssistant {
    /// Create a relay client for `endpoint_url` with a whole-request timeout.
    pub fn new(endpoint_url: impl Into<String>, timeout: Duration) -> dbtchat_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint_url: endpoint_url.into(),
            timeout,
            client,
        })
    }

    pub fn from_config(config: &AssistantConfig) -> dbtchat_core::Result<Self> {
        Self::new(
            config.endpoint_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            GatewayError::Unreachable {
                reason: e.to_string(),
            }
        }
    }

    /// Map a decoded relay response to an answer or a failure.
    pub fn interpret(response: AssistantResponse) -> Result<String, GatewayError> {
        if response.returncode != 0 {
            let stderr = response.stderr.trim();
            return Err(GatewayError::NonZeroExit {
                code: response.returncode,
                stderr: if stderr.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    stderr.to_string()
                },
            });
        }
        Ok(normalize_output(&response.stdout))
    }
}

#[async_trait]
impl Assistant for HttpAssistant {
    fn name(&self) -> &str {
        "http_relay"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!(prompt_bytes = prompt.len(), "Sending prompt to assistant relay");

        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&AssistantRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Assistant relay returned error status");
            return Err(GatewayError::HttpError {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let decoded: AssistantResponse = serde_json::from_slice(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        debug!(
            returncode = decoded.returncode,
            stdout_bytes = decoded.stdout.len(),
            "Assistant relay responded"
        );

        Self::interpret(decoded)
    }
}
