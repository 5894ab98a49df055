//! The typed claims envelope.
//!
//! [`TypedClaims`] joins the registered claims, the claim type tag and a
//! payload into one flat JSON object. Encoding and decoding go through
//! `serde_json` maps so that the tag can be checked before the payload is
//! touched.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::claims::Claims;
use crate::error::{ClaimsError, Result};
use crate::registered::{Audience, RegisteredClaims};

/// JSON key holding the claim type tag.
pub const CLAIM_TYPE_KEY: &str = "mct";

/// Keys owned by the envelope. Payload fields may not use them.
pub const RESERVED_KEYS: [&str; 8] = [
    "iss",
    "sub",
    "aud",
    "exp",
    "nbf",
    "iat",
    "jti",
    CLAIM_TYPE_KEY,
];

/// Registered claims, a claim type tag and a payload of type `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedClaims<T> {
    pub registered: RegisteredClaims,
    pub claim_type: String,
    pub claims: T,
}

impl<T: Claims> TypedClaims<T> {
    /// Envelope around `claims` with the given registered claims.
    pub fn new(registered: RegisteredClaims, claims: T) -> Self {
        Self {
            registered,
            claim_type: T::CLAIM_TYPE.to_string(),
            claims,
        }
    }

    /// Wrap `claims` for signing, valid from now for `duration`.
    pub fn wrap(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        id: impl Into<String>,
        audience: impl Into<Audience>,
        duration: Duration,
        claims: T,
    ) -> Self {
        Self::wrap_at(now_secs(), issuer, subject, id, audience, duration, claims)
    }

    /// Like [`wrap`](Self::wrap) with an explicit current time in Unix seconds.
    pub fn wrap_at(
        now: i64,
        issuer: impl Into<String>,
        subject: impl Into<String>,
        id: impl Into<String>,
        audience: impl Into<Audience>,
        duration: Duration,
        claims: T,
    ) -> Self {
        let lifetime = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        Self::new(
            RegisteredClaims {
                issuer: issuer.into(),
                subject: subject.into(),
                audience: audience.into(),
                expires_at: Some(now.saturating_add(lifetime)),
                not_before: Some(now),
                issued_at: Some(now),
                id: id.into(),
            },
            claims,
        )
    }

    /// Check the tag, then the payload's own rules.
    pub fn valid(&self) -> Result<()> {
        if self.claim_type != T::CLAIM_TYPE {
            return Err(ClaimsError::ClaimTypeMismatch {
                expected: T::CLAIM_TYPE.to_string(),
                actual: self.claim_type.clone(),
            });
        }
        self.claims.valid()
    }

    /// Encode into a single flat JSON object.
    pub fn to_json_map(&self) -> Result<Map<String, Value>> {
        let mut map = match serde_json::to_value(&self.registered)? {
            Value::Object(map) => map,
            _ => return Err(ClaimsError::NotAnObject("registered claims")),
        };
        map.insert(
            CLAIM_TYPE_KEY.to_string(),
            Value::String(self.claim_type.clone()),
        );

        let payload = match serde_json::to_value(&self.claims)? {
            Value::Object(payload) => payload,
            _ => return Err(ClaimsError::NotAnObject("claims payload")),
        };
        for (key, value) in payload {
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(ClaimsError::ClaimCollision(key));
            }
            map.insert(key, value);
        }

        Ok(map)
    }

    /// Decode from a flat JSON object.
    ///
    /// Fails with [`ClaimsError::ClaimTypeMismatch`] before the payload is
    /// decoded when the stored tag differs from `T::CLAIM_TYPE`.
    pub fn from_json_map(mut map: Map<String, Value>) -> Result<Self> {
        let claim_type = map
            .get(CLAIM_TYPE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if claim_type != T::CLAIM_TYPE {
            return Err(ClaimsError::ClaimTypeMismatch {
                expected: T::CLAIM_TYPE.to_string(),
                actual: claim_type,
            });
        }

        let mut header = Map::new();
        for key in RESERVED_KEYS {
            if let Some(value) = map.remove(key) {
                header.insert(key.to_string(), value);
            }
        }
        let registered: RegisteredClaims = serde_json::from_value(Value::Object(header))?;
        let claims: T = serde_json::from_value(Value::Object(map))?;

        Ok(Self {
            registered,
            claim_type,
            claims,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.registered.issuer
    }

    pub fn subject(&self) -> &str {
        &self.registered.subject
    }

    pub fn id(&self) -> &str {
        &self.registered.id
    }

    pub fn audience(&self) -> &Audience {
        &self.registered.audience
    }
}

impl<T: Claims> Serialize for TypedClaims<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_map()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, T: Claims> Deserialize<'de> for TypedClaims<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_json_map(map).map_err(D::Error::custom)
    }
}

/// Current Unix time in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
