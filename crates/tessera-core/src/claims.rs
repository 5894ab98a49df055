//! The payload capability and the empty payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A payload that can ride inside a [`TypedClaims`](crate::TypedClaims) envelope.
///
/// `CLAIM_TYPE` is written to the `mct` field when signing and compared on
/// decode. It must be unique among the payload types a verifier accepts.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use tessera_core::{Claims, ClaimsError};
///
/// #[derive(Serialize, Deserialize)]
/// struct Invite {
///     room: String,
/// }
///
/// impl Claims for Invite {
///     const CLAIM_TYPE: &'static str = "invite";
///
///     fn valid(&self) -> tessera_core::Result<()> {
///         if self.room.is_empty() {
///             return Err(ClaimsError::invalid("room is required"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Claims: Serialize + DeserializeOwned {
    /// Stable tag identifying this payload type on the wire.
    const CLAIM_TYPE: &'static str;

    /// Semantic checks run after signature and time checks pass.
    fn valid(&self) -> Result<()> {
        Ok(())
    }
}

/// A payload with no fields. Always valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyClaims {}

impl Claims for EmptyClaims {
    const CLAIM_TYPE: &'static str = "empty-claims";
}
