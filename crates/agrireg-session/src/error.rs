//! Error types for the session subsystem

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur in the session subsystem
///
/// Operations invoked without an active session are not errors; they are
/// silent no-ops so that timer callbacks racing a logout stay harmless.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Warning threshold must be strictly below the hard threshold
    #[error("Warning threshold ({warning_ms} ms) must be below hard threshold ({hard_ms} ms)")]
    InvalidThresholds { warning_ms: u64, hard_ms: u64 },

    /// Thresholds must be positive
    #[error("Session thresholds must be greater than zero")]
    ZeroThreshold,

    /// Threshold does not fit in milliseconds as `u64`
    #[error("Session threshold is too large")]
    ThresholdTooLarge,

    /// Authentication collaborator rejected the request
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
