//! Ready-made token kinds for authentication flows.
//!
//! Access tokens carry a [`PermissionSet`](tessera_perms::PermissionSet) and
//! live for 15 minutes by default. Refresh tokens point back at the access
//! token they were issued with and live for 7 days by default.

pub mod access;
pub mod pair;
pub mod refresh;

pub use access::{
    create_access_token, create_access_token_with_duration,
    create_access_token_with_duration_and_kid, create_access_token_with_kid, AccessTokenClaims,
    ACCESS_TOKEN_DURATION,
};
pub use pair::{create_token_pair, create_token_pair_with_duration, TokenPair};
pub use refresh::{
    create_refresh_token, create_refresh_token_with_duration,
    create_refresh_token_with_duration_and_kid, create_refresh_token_with_kid, RefreshTokenClaims,
    REFRESH_TOKEN_DURATION,
};
