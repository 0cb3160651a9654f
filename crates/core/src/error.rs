//! Error types for the dbtchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum, aggregated by [`Error`].

use thiserror::Error;

/// The top-level error type for a chat request.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("{0}")]
    Validation(String),

    // --- Portal lookups ---
    #[error("Manifest not found for project {project}")]
    NotFound { project: String },

    // --- Manifest reduction ---
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    // --- Assistant gateway ---
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is detected before the chat pipeline runs.
    ///
    /// Request-level errors are answered with a structured client error;
    /// everything else is a pipeline failure.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Error: manifest could not be parsed: {0}")]
    Malformed(String),

    #[error("Error: reduced manifest could not be serialized: {0}")]
    Serialize(String),
}

/// Failure of the outbound assistant call.
///
/// The `Display` output is the user-visible message; it never includes
/// endpoint URLs or other internal detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Error: the assistant did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Error: the assistant is unreachable")]
    Unreachable { reason: String },

    #[error("HTTP Error: {status}")]
    HttpError { status: u16 },

    #[error("Error: {stderr}")]
    NonZeroExit { code: i64, stderr: String },

    #[error("Error: invalid assistant response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Unreachable { .. } => "unreachable",
            Self::HttpError { .. } => "http_error",
            Self::NonZeroExit { .. } => "non_zero_exit",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}
