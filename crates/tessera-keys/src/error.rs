//! Error types for key storage.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from key lookup, key codecs and key directories.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("missing private key for kid {0:?}")]
    MissingPrivateKey(String),

    #[error("missing public key for kid {0:?}")]
    MissingPublicKey(String),

    #[error("missing key pair for kid {0:?}")]
    MissingKeyPair(String),

    #[error("unexpected PEM label {0:?}")]
    UnexpectedPemLabel(String),

    #[error("pem error: {0}")]
    Pem(#[from] pem::PemError),

    #[error("pkcs1 error: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    #[error("pkcs8 error: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    #[error("spki error: {0}")]
    Spki(#[from] rsa::pkcs8::spki::Error),

    #[error("rsa error: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", join(.0))]
    Joined(Vec<KeyError>),
}

impl KeyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KeyError::Io {
            path: path.into(),
            source,
        }
    }
}

fn join(errors: &[KeyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
