//! Error types for claim encoding and validation.

use thiserror::Error;

/// Errors raised while building, encoding, decoding or validating claims.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("claim type mismatch: expected {expected:?}, got {actual:?}")]
    ClaimTypeMismatch { expected: String, actual: String },

    #[error("payload field {0:?} collides with a registered claim")]
    ClaimCollision(String),

    #[error("{0} does not encode to a JSON object")]
    NotAnObject(&'static str),

    #[error("invalid claims: {0}")]
    Invalid(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClaimsError {
    /// Shorthand for payload validation failures.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ClaimsError::Invalid(msg.into())
    }
}

/// Result type for claim operations.
pub type Result<T> = std::result::Result<T, ClaimsError>;
