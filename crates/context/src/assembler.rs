//! Conversation assembly: builds the single text payload sent to the assistant.
//!
//! Layout, in order:
//!
//! 1. **Instructions**: the rendered [`PromptTemplate`] (project + manifest)
//! 2. **History**: each prior turn as `"Role: content"`, original order
//! 3. **New message**: `"User: <message>"`, always last
//!
//! Every turn part starts with a newline and parts are joined with newlines,
//! so consecutive turns are separated by one blank line.
//!
//! # Determinism
//!
//! Identical inputs always produce identical payloads. History length is not
//! capped here.

use crate::template::PromptTemplate;
use dbtchat_core::message::{Role, Turn};

/// The conversation assembler. Stateless: create one and reuse it.
#[derive(Debug, Clone, Default)]
pub struct ConversationAssembler {
    template: PromptTemplate,
}

impl ConversationAssembler {
    /// Create an assembler with the given instruction template.
    pub fn new(template: PromptTemplate) -> Self {
        Self { template }
    }

    /// Assemble the payload for one assistant call.
    pub fn assemble(
        &self,
        project_name: &str,
        context_content: &str,
        history: &[Turn],
        new_message: &str,
    ) -> String {
        let mut parts = Vec::with_capacity(history.len() + 2);
        parts.push(self.template.render(project_name, context_content));
        parts.extend(history.iter().map(|turn| format!("\n{}", turn.render())));
        parts.push(format!("\n{}: {}", Role::User.label(), new_message));
        parts.join("\n")
    }
}
