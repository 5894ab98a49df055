//! # Tessera
//!
//! Typed-claim JSON Web Tokens signed with named RSA keys.
//!
//! ## Overview
//!
//! Tessera signs and verifies JWTs whose payload is a strongly typed Rust
//! value. Every token carries a claim type tag (`mct`) next to the registered
//! claims, so a token minted for one payload type is never accepted as
//! another.
//!
//! - **Issuer**: wraps a payload with registered claims and signs it with a
//!   default key or a key picked by `kid`
//! - **Verifier**: picks the public key from the token's `kid` header, checks
//!   signature and times, then the tag and the payload's own rules
//! - **KeyStore**: the kid-addressed key table shared by both, optionally
//!   backed by a directory of PEM files
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tessera::auth::AccessTokenClaims;
//! use tessera::{generate_private_key, Audience, Issuer, IssuerConfig, KeyStore, PermissionSet};
//!
//! let keys = Arc::new(KeyStore::new());
//! keys.load_private_key("key1", generate_private_key(2048)?);
//!
//! let issuer = Issuer::with_kid(IssuerConfig::new("auth"), "key1", keys)?;
//! let perms = PermissionSet::parse("svc:read svc:write");
//! let token = issuer.sign(
//!     "1",
//!     "test",
//!     Audience::new(),
//!     Duration::from_secs(60),
//!     AccessTokenClaims::new(perms),
//! )?;
//!
//! let verified = issuer.verifier().verify::<AccessTokenClaims>(&token)?;
//! assert_eq!(verified.claims.subject(), "1");
//! assert!(verified.claims.claims.perms.has("svc:write"));
//! # Ok::<(), tessera::Error>(())
//! ```
//!
//! ## Re-exports
//!
//! - `tessera::core` - Claims envelope ([`TypedClaims`], [`Claims`])
//! - `tessera::keys` - Key storage ([`KeyStore`], [`KeyDir`])
//! - `tessera::perms` - Permission sets ([`PermissionSet`])

pub mod auth;
pub mod error;
pub mod issuer;
pub mod jwks;
pub mod verifier;

// Re-export component crates
pub use tessera_core as core;
pub use tessera_keys as keys;
pub use tessera_perms as perms;

pub use error::{Error, Result};
pub use issuer::{Issuer, IssuerConfig};
pub use jwks::{jwk_set, write_jwk_set_json, Jwk, JwkSet, KeyUse};
pub use verifier::{header_kid, VerifiedToken, Verifier, VerifierConfig};

pub use jsonwebtoken::Algorithm;
pub use tessera_core::{Audience, Claims, ClaimsError, EmptyClaims, RegisteredClaims, TypedClaims};
pub use tessera_keys::{
    generate_private_key, FsKeyDir, KeyDir, KeyError, KeyLayout, KeyStore, MemoryKeyDir,
    RsaPrivateKey, RsaPublicKey,
};
pub use tessera_perms::PermissionSet;
