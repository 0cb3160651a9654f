//! Assistant gateway for dbtchat.
//!
//! [`HttpAssistant`] implements `dbtchat_core::Assistant` against the local
//! relay endpoint; [`normalize`] cleans the raw terminal output it returns.

pub mod http;
pub mod normalize;

pub use http::HttpAssistant;
pub use normalize::{normalize_output, unescape_html};
