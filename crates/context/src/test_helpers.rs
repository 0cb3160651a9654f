//! Shared test helpers for pipeline tests.

use dbtchat_core::assistant::Assistant;
use dbtchat_core::error::GatewayError;
use std::sync::Mutex;

/// A mock assistant that returns one scripted result and records prompts.
pub struct ScriptedAssistant {
    result: Result<String, GatewayError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAssistant {
    /// Always answer with `text`.
    pub fn answering(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: GatewayError) -> Self {
        Self {
            result: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Assistant for ScriptedAssistant {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone()
    }
}
