//! The chat pipeline: one request, one sequential path.
//!
//! ```text
//! message ─▶ Guard ─(refuse)──────────────────────────────▶ refusal text
//!              │
//!              └─(pass)─▶ Reducer ─▶ Assembler ─▶ Assistant ─▶ answer text
//! ```
//!
//! The pipeline holds no per-request state, so a single instance is shared
//! across concurrent requests.

use crate::assembler::ConversationAssembler;
use crate::reducer::ManifestReducer;
use crate::template::{PromptTemplate, TemplateError};
use dbtchat_config::AppConfig;
use dbtchat_core::assistant::Assistant;
use dbtchat_core::error::{Error, Result};
use dbtchat_core::message::Turn;
use dbtchat_security::GuardFilter;
use std::sync::Arc;
use tracing::{info, warn};

/// Message returned when required request fields are missing.
pub const MISSING_FIELDS: &str = "project_name and message are required";

/// The result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The guard short-circuited; the assistant was not contacted
    Refused(String),
    /// The assistant's normalized answer
    Answered(String),
}

impl ChatOutcome {
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refused(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Refused(text) | Self::Answered(text) => text,
        }
    }
}

/// Reject requests without a project name or message.
///
/// Only empty strings are missing; whitespace counts as content.
pub fn require_fields(project_name: &str, message: &str) -> Result<()> {
    if project_name.is_empty() || message.is_empty() {
        return Err(Error::Validation(MISSING_FIELDS.into()));
    }
    Ok(())
}

/// Guard → Reducer → Assembler → Assistant.
pub struct ChatPipeline {
    guard: GuardFilter,
    reducer: ManifestReducer,
    assembler: ConversationAssembler,
    assistant: Arc<dyn Assistant>,
}

impl ChatPipeline {
    pub fn new(
        guard: GuardFilter,
        reducer: ManifestReducer,
        assembler: ConversationAssembler,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        Self {
            guard,
            reducer,
            assembler,
            assistant,
        }
    }

    /// Build a pipeline from configuration around the given assistant.
    pub fn from_config(
        config: &AppConfig,
        assistant: Arc<dyn Assistant>,
    ) -> std::result::Result<Self, TemplateError> {
        let template = match &config.prompt.template_file {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::builtin(),
        };

        Ok(Self::new(
            GuardFilter::from_config(&config.guard),
            ManifestReducer::new(config.manifest.reduction_threshold_bytes),
            ConversationAssembler::new(template),
            assistant,
        ))
    }

    /// Check only the guard. Returns the refusal text when the message must
    /// not proceed, so callers can answer before loading a manifest.
    pub fn screen(&self, message: &str) -> Option<&str> {
        self.guard
            .should_refuse(message)
            .then(|| self.guard.refusal())
    }

    pub fn reducer(&self) -> &ManifestReducer {
        &self.reducer
    }

    /// Run the full pipeline for one chat request.
    pub async fn run(
        &self,
        project_name: &str,
        manifest_text: &str,
        history: &[Turn],
        message: &str,
    ) -> Result<ChatOutcome> {
        if let Some(refusal) = self.screen(message) {
            return Ok(ChatOutcome::Refused(refusal.to_string()));
        }

        let context = self.reducer.reduce(manifest_text)?;
        let prompt = self
            .assembler
            .assemble(project_name, &context, history, message);

        info!(
            project = %project_name,
            assistant = self.assistant.name(),
            manifest_bytes = manifest_text.len(),
            context_bytes = context.len(),
            prompt_bytes = prompt.len(),
            turns = history.len(),
            "Invoking assistant"
        );

        match self.assistant.invoke(&prompt).await {
            Ok(answer) => Ok(ChatOutcome::Answered(answer)),
            Err(e) => {
                warn!(project = %project_name, kind = e.kind(), error = ?e, "Assistant call failed");
                Err(e.into())
            }
        }
    }

    /// Like [`run`](Self::run), but every failure is rendered as the
    /// user-visible error string instead of being returned.
    pub async fn respond(
        &self,
        project_name: &str,
        manifest_text: &str,
        history: &[Turn],
        message: &str,
    ) -> String {
        match self.run(project_name, manifest_text, history, message).await {
            Ok(outcome) => outcome.into_text(),
            Err(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedAssistant;
    use dbtchat_core::error::GatewayError;
    use dbtchat_security::DEFAULT_REFUSAL;

    fn pipeline(assistant: Arc<ScriptedAssistant>) -> ChatPipeline {
        ChatPipeline::from_config(&AppConfig::default(), assistant).unwrap()
    }

    const SMALL_MANIFEST: &str = r#"{"metadata":{},"nodes":{"model.p.a":{"resource_type":"model"}}}"#;

    #[tokio::test]
    async fn refusal_never_reaches_assistant() {
        let assistant = Arc::new(ScriptedAssistant::answering("should not be used"));
        let pipeline = pipeline(assistant.clone());

        for message in ["Create a table", "please WRITE a file", "שמור את זה"] {
            let outcome = pipeline.run("p", "{not even json", &[], message).await.unwrap();
            assert_eq!(outcome, ChatOutcome::Refused(DEFAULT_REFUSAL.into()));
        }
        assert_eq!(assistant.calls(), 0);
    }

    #[tokio::test]
    async fn answer_is_returned() {
        let assistant = Arc::new(ScriptedAssistant::answering("It sums revenue."));
        let pipeline = pipeline(assistant.clone());

        let outcome = pipeline
            .run("sales", SMALL_MANIFEST, &[], "What does model a do?")
            .await
            .unwrap();

        assert_eq!(outcome, ChatOutcome::Answered("It sums revenue.".into()));
        assert_eq!(assistant.calls(), 1);

        let prompt = assistant.last_prompt().unwrap();
        assert!(prompt.contains("Project: sales"));
        assert!(prompt.contains(SMALL_MANIFEST));
        assert!(prompt.ends_with("User: What does model a do?"));
    }

    #[tokio::test]
    async fn history_flows_into_prompt() {
        let assistant = Arc::new(ScriptedAssistant::answering("ok"));
        let pipeline = pipeline(assistant.clone());
        let history = vec![Turn::user("first"), Turn::assistant("second")];

        pipeline
            .run("p", SMALL_MANIFEST, &history, "third")
            .await
            .unwrap();

        let prompt = assistant.last_prompt().unwrap();
        let first = prompt.find("User: first").unwrap();
        let second = prompt.find("Assistant: second").unwrap();
        let third = prompt.find("User: third").unwrap();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn malformed_large_manifest_skips_assistant() {
        let assistant = Arc::new(ScriptedAssistant::answering("unused"));
        let pipeline = pipeline(assistant.clone());
        let broken = format!("{{\"nodes\": \"{}", "x".repeat(120_000));

        let err = pipeline.run("p", &broken, &[], "hi").await.unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
        assert!(!err.is_request_error());
        assert_eq!(assistant.calls(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_is_rendered_by_respond() {
        let assistant = Arc::new(ScriptedAssistant::failing(GatewayError::HttpError {
            status: 503,
        }));
        let pipeline = pipeline(assistant.clone());

        let text = pipeline.respond("p", SMALL_MANIFEST, &[], "hi").await;
        assert_eq!(text, "HTTP Error: 503");
        assert_eq!(assistant.calls(), 1);
    }

    #[test]
    fn required_fields() {
        assert!(require_fields("p", "m").is_ok());
        let err = require_fields("", "m").unwrap_err();
        assert_eq!(err.to_string(), MISSING_FIELDS);
        assert!(require_fields("p", "").is_err());
    }

    #[test]
    fn whitespace_message_is_present() {
        assert!(require_fields("p", "  ").is_ok());
        assert!(require_fields("p", "\n").is_ok());
    }

    #[test]
    fn screen_reports_refusal_text() {
        let pipeline = pipeline(Arc::new(ScriptedAssistant::answering("x")));
        assert_eq!(pipeline.screen("save it"), Some(DEFAULT_REFUSAL));
        assert_eq!(pipeline.screen("explain it"), None);
    }
}
