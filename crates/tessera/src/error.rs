//! Error types for signing and verifying tokens.

use tessera_core::ClaimsError;
use tessera_keys::KeyError;
use thiserror::Error;

/// Errors that can occur while issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum Error {
    /// Envelope encoding, tag mismatch or payload validation failed.
    #[error("claims error: {0}")]
    Claims(#[from] ClaimsError),

    /// Key lookup, codec or key directory failure.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// The issuer has no default key and no kid was given.
    #[error("no signing key configured")]
    NoSigningKey,

    #[error("no public key found for kid {}", .kid.as_deref().unwrap_or("<default>"))]
    NoPublicKeyFound { kid: Option<String> },

    /// The token header carries a `kid` that is not a string.
    #[error("kid header is not a string")]
    KidInvalid,

    /// Signature, time or structural check failed.
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The underlying JWT error kind, if this is a JWT failure.
    pub fn jwt_kind(&self) -> Option<&jsonwebtoken::errors::ErrorKind> {
        match self {
            Error::Jwt(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Result type for token operations.
pub type Result<T> = std::result::Result<T, Error>;
