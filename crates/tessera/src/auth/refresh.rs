//! Refresh tokens.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tessera_core::{Audience, Claims};

use crate::error::Result;
use crate::issuer::Issuer;

pub const REFRESH_TOKEN_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// The `ati` field holds the `jti` of the access token this refresh token
/// was issued with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    #[serde(rename = "ati")]
    pub access_token_id: String,
}

impl Claims for RefreshTokenClaims {
    const CLAIM_TYPE: &'static str = "refresh-token";
}

pub fn create_refresh_token(
    issuer: &Issuer,
    subject: &str,
    id: &str,
    access_token_id: &str,
    audience: impl Into<Audience>,
) -> Result<String> {
    create_refresh_token_with_duration(
        issuer,
        REFRESH_TOKEN_DURATION,
        subject,
        id,
        access_token_id,
        audience,
    )
}

pub fn create_refresh_token_with_duration(
    issuer: &Issuer,
    duration: Duration,
    subject: &str,
    id: &str,
    access_token_id: &str,
    audience: impl Into<Audience>,
) -> Result<String> {
    let claims = RefreshTokenClaims {
        access_token_id: access_token_id.to_string(),
    };
    issuer.sign(subject, id, audience, duration, claims)
}

pub fn create_refresh_token_with_kid(
    issuer: &Issuer,
    subject: &str,
    id: &str,
    access_token_id: &str,
    audience: impl Into<Audience>,
    kid: &str,
) -> Result<String> {
    create_refresh_token_with_duration_and_kid(
        issuer,
        REFRESH_TOKEN_DURATION,
        subject,
        id,
        access_token_id,
        audience,
        kid,
    )
}

pub fn create_refresh_token_with_duration_and_kid(
    issuer: &Issuer,
    duration: Duration,
    subject: &str,
    id: &str,
    access_token_id: &str,
    audience: impl Into<Audience>,
    kid: &str,
) -> Result<String> {
    let claims = RefreshTokenClaims {
        access_token_id: access_token_id.to_string(),
    };
    issuer.sign_with_kid(subject, id, audience, duration, claims, kid)
}
