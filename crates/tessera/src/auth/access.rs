//! Access tokens.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tessera_core::{Audience, Claims};
use tessera_perms::PermissionSet;

use crate::error::Result;
use crate::issuer::Issuer;

pub const ACCESS_TOKEN_DURATION: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(rename = "per", default)]
    pub perms: PermissionSet,
    #[serde(rename = "uid", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AccessTokenClaims {
    pub fn new(perms: PermissionSet) -> Self {
        Self {
            perms,
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl Claims for AccessTokenClaims {
    const CLAIM_TYPE: &'static str = "access-token";
}

pub fn create_access_token(
    issuer: &Issuer,
    subject: &str,
    id: &str,
    audience: impl Into<Audience>,
    perms: PermissionSet,
) -> Result<String> {
    create_access_token_with_duration(issuer, ACCESS_TOKEN_DURATION, subject, id, audience, perms)
}

pub fn create_access_token_with_duration(
    issuer: &Issuer,
    duration: Duration,
    subject: &str,
    id: &str,
    audience: impl Into<Audience>,
    perms: PermissionSet,
) -> Result<String> {
    issuer.sign(subject, id, audience, duration, AccessTokenClaims::new(perms))
}

pub fn create_access_token_with_kid(
    issuer: &Issuer,
    subject: &str,
    id: &str,
    audience: impl Into<Audience>,
    perms: PermissionSet,
    kid: &str,
) -> Result<String> {
    create_access_token_with_duration_and_kid(
        issuer,
        ACCESS_TOKEN_DURATION,
        subject,
        id,
        audience,
        perms,
        kid,
    )
}

pub fn create_access_token_with_duration_and_kid(
    issuer: &Issuer,
    duration: Duration,
    subject: &str,
    id: &str,
    audience: impl Into<Audience>,
    perms: PermissionSet,
    kid: &str,
) -> Result<String> {
    issuer.sign_with_kid(
        subject,
        id,
        audience,
        duration,
        AccessTokenClaims::new(perms),
        kid,
    )
}
