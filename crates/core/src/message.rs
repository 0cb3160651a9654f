//! Conversation turn types.
//!
//! Turns are supplied fresh on every request by the caller; nothing here is
//! stored between requests.

use serde::{Deserialize, Serialize};

/// The role of a conversation participant.
///
/// Only two roles exist in a chat history; anything else is rejected when
/// the request body is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The external assistant
    Assistant,
}

impl Role {
    /// Label used when the turn is rendered into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single prior turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Render as `"Role: content"`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}
