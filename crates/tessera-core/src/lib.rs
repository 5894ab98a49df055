//! # Tessera Core
//!
//! Claim types shared by everything that signs or verifies Tessera tokens.
//!
//! This crate has no keys and does no cryptography. It defines what goes
//! inside a token and how that content maps onto a flat JSON object.
//!
//! ## Key Types
//!
//! - [`Claims`] - Capability implemented by every payload type: a stable tag
//!   plus a semantic validity check
//! - [`RegisteredClaims`] - The standard JWT fields (`iss`, `sub`, `aud`, ...)
//! - [`TypedClaims`] - The envelope: registered claims, the `mct` tag and a payload
//! - [`EmptyClaims`] - A payload without fields
//!
//! ## Wire Format
//!
//! An envelope serializes to a single JSON object. The registered fields, the
//! `mct` tag and every field of the payload sit side by side:
//!
//! ```json
//! {"iss":"auth","sub":"1","jti":"abc","iat":1700000000,"nbf":1700000000,
//!  "exp":1700000900,"mct":"access-token","per":["svc:read"]}
//! ```
//!
//! Decoding checks `mct` against the expected payload type before the payload
//! itself is decoded, so a token minted for one type is never read as another.

pub mod claims;
pub mod envelope;
pub mod error;
pub mod registered;

pub use claims::{Claims, EmptyClaims};
pub use envelope::{now_secs, TypedClaims, CLAIM_TYPE_KEY, RESERVED_KEYS};
pub use error::{ClaimsError, Result};
pub use registered::{Audience, RegisteredClaims};
