//! Security policies for dbtchat: the mutation guard and portal path checks.
//!
//! Provides:
//! - **Guard**: refuses messages asking the assistant to create or write files
//! - **Path validation**: keeps project lookups inside the portal directory

pub mod guard;
pub mod path;

pub use guard::{GuardFilter, GuardVerdict, DEFAULT_REFUSAL, DEFAULT_TRIGGERS};
pub use path::{validate_project_name, PathValidationError};
