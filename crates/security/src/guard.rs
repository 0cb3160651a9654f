//! Mutation-intent guard: refuses requests that ask for files to be written.
//!
//! The assistant can only read manifest content. Any message that asks it to
//! create, write or save something is answered with a fixed refusal and never
//! reaches the rest of the pipeline.
//!
//! The trigger set is a policy artifact kept apart from the matching logic,
//! so it can be reviewed and overridden from configuration.

use dbtchat_config::GuardConfig;
use tracing::info;

/// Built-in trigger phrases, English and Hebrew.
pub const DEFAULT_TRIGGERS: &[&str] = &[
    "create",
    "write",
    "save",
    "generate file",
    "make file",
    "צור",
    "כתוב",
    "שמור",
    "יצור",
];

/// Built-in refusal ("I'm a chat, not a renovation contractor. Questions only!").
pub const DEFAULT_REFUSAL: &str = "אני צ'אט, לא קבלן שיפוצים. שאלות בלבד !👷‍♂️";

/// Result of checking a message against the guard.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardVerdict {
    /// Message may proceed to the assistant
    Pass,
    /// Message must be answered with the refusal
    Refuse { trigger: String },
}

/// Case-insensitive substring guard over a fixed trigger set.
#[derive(Debug, Clone)]
pub struct GuardFilter {
    /// Lowercased triggers
    triggers: Vec<String>,
    refusal: String,
}

impl GuardFilter {
    /// Create a guard with explicit triggers and refusal text.
    pub fn new<I, S>(triggers: I, refusal: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            triggers: triggers
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
            refusal: refusal.into(),
        }
    }

    /// Build the guard from configuration, falling back to the built-in policy.
    pub fn from_config(config: &GuardConfig) -> Self {
        let refusal = config.refusal.as_deref().unwrap_or(DEFAULT_REFUSAL);
        match &config.triggers {
            Some(triggers) => Self::new(triggers, refusal),
            None => Self::new(DEFAULT_TRIGGERS, refusal),
        }
    }

    /// Check a message and report which trigger matched.
    pub fn check(&self, message: &str) -> GuardVerdict {
        let lowered = message.to_lowercase();
        match self.triggers.iter().find(|t| lowered.contains(t.as_str())) {
            Some(trigger) => {
                info!(trigger = %trigger, "Guard refused mutation request");
                GuardVerdict::Refuse {
                    trigger: trigger.clone(),
                }
            }
            None => GuardVerdict::Pass,
        }
    }

    /// Whether the message must be refused.
    pub fn should_refuse(&self, message: &str) -> bool {
        matches!(self.check(message), GuardVerdict::Refuse { .. })
    }

    /// The fixed refusal text.
    pub fn refusal(&self) -> &str {
        &self.refusal
    }

    /// The active triggers (lowercased).
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }
}

impl Default for GuardFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS, DEFAULT_REFUSAL)
    }
}
