//! The manifest-aware conversation assembler for dbtchat.
//!
//! Turns a raw dbt manifest plus a chat turn into one bounded prompt:
//!
//! 1. **Guard** the message against mutation requests (`dbtchat-security`)
//! 2. **Reduce** the manifest when it exceeds the size threshold
//! 3. **Assemble** instructions, manifest context and history into one payload
//! 4. **Invoke** the assistant and return its normalized answer
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`reducer`] | pass-through vs. model-only summarization |
//! | [`template`] | instruction template with project/manifest slots |
//! | [`assembler`] | ordered payload construction |
//! | [`pipeline`] | the end-to-end request path |

pub mod assembler;
pub mod pipeline;
pub mod reducer;
pub mod template;

#[cfg(test)]
mod test_helpers;

pub use assembler::ConversationAssembler;
pub use pipeline::{require_fields, ChatOutcome, ChatPipeline, MISSING_FIELDS};
pub use reducer::{summarize, ManifestReducer, Reduction, DEFAULT_THRESHOLD_BYTES};
pub use template::{PromptTemplate, TemplateError, BUILTIN_TEMPLATE};
