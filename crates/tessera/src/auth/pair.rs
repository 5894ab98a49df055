//! Access and refresh token pairs.

use std::time::Duration;

use tessera_core::Audience;
use tessera_perms::PermissionSet;

use crate::auth::access::{create_access_token_with_duration, ACCESS_TOKEN_DURATION};
use crate::auth::refresh::{create_refresh_token_with_duration, REFRESH_TOKEN_DURATION};
use crate::error::Result;
use crate::issuer::Issuer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issue an access token and a refresh token linked to it, with the default
/// durations.
#[allow(clippy::too_many_arguments)]
pub fn create_token_pair(
    issuer: &Issuer,
    subject: &str,
    access_id: &str,
    refresh_id: &str,
    access_audience: impl Into<Audience>,
    refresh_audience: impl Into<Audience>,
    perms: PermissionSet,
) -> Result<TokenPair> {
    create_token_pair_with_duration(
        issuer,
        ACCESS_TOKEN_DURATION,
        REFRESH_TOKEN_DURATION,
        subject,
        access_id,
        refresh_id,
        access_audience,
        refresh_audience,
        perms,
    )
}

/// Issue an access token and a refresh token whose `ati` is the access
/// token's id.
#[allow(clippy::too_many_arguments)]
pub fn create_token_pair_with_duration(
    issuer: &Issuer,
    access_duration: Duration,
    refresh_duration: Duration,
    subject: &str,
    access_id: &str,
    refresh_id: &str,
    access_audience: impl Into<Audience>,
    refresh_audience: impl Into<Audience>,
    perms: PermissionSet,
) -> Result<TokenPair> {
    let access = create_access_token_with_duration(
        issuer,
        access_duration,
        subject,
        access_id,
        access_audience,
        perms,
    )?;
    let refresh = create_refresh_token_with_duration(
        issuer,
        refresh_duration,
        subject,
        refresh_id,
        access_id,
        refresh_audience,
    )?;

    Ok(TokenPair { access, refresh })
}
