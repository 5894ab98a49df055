//! Token verification.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde_json::{Map, Value};

use tessera_core::{Claims, TypedClaims};
use tessera_keys::{read_public_key_file, KeyStore};

use crate::error::{Error, Result};

/// Configuration for a [`Verifier`].
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Accepted signature algorithms.
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerance in seconds for `exp` and `nbf`.
    pub leeway: u64,
    /// Required `iss`, if any.
    pub issuer: Option<String>,
    /// Accepted audiences. When unset, `aud` is not checked.
    pub audience: Option<Vec<String>>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512],
            leeway: 0,
            issuer: None,
            audience: None,
        }
    }
}

/// A token whose signature, times and claims all checked out.
#[derive(Debug, Clone)]
pub struct VerifiedToken<T> {
    pub header: Header,
    /// The `kid` used to pick the verification key, if the header had one.
    pub kid: Option<String>,
    pub claims: TypedClaims<T>,
}

/// Verifies tokens against a shared [`KeyStore`] and an optional default key.
///
/// Tokens with a `kid` header are checked with that kid's public key. Tokens
/// without one fall back to the default public key.
#[derive(Debug, Clone)]
pub struct Verifier {
    config: VerifierConfig,
    keys: Arc<KeyStore>,
    default_key: Option<Arc<RsaPublicKey>>,
}

impl Verifier {
    /// Verifier using only kid-addressed keys.
    pub fn new(config: VerifierConfig, keys: Arc<KeyStore>) -> Self {
        Self {
            config,
            keys,
            default_key: None,
        }
    }

    /// Verifier with a default public key for tokens without a `kid`.
    pub fn with_public_key(config: VerifierConfig, key: RsaPublicKey, keys: Arc<KeyStore>) -> Self {
        Self::with_shared_public_key(config, Arc::new(key), keys)
    }

    pub(crate) fn with_shared_public_key(
        config: VerifierConfig,
        key: Arc<RsaPublicKey>,
        keys: Arc<KeyStore>,
    ) -> Self {
        Self {
            config,
            keys,
            default_key: Some(key),
        }
    }

    /// Verifier whose default key is read from a PEM file.
    pub fn from_public_key_file(config: VerifierConfig, path: impl AsRef<Path>) -> Result<Self> {
        let key = read_public_key_file(path)?;
        Ok(Self::with_public_key(config, key, Arc::new(KeyStore::new())))
    }

    /// Verifier whose keys are loaded from a key directory.
    pub fn from_key_dir(config: VerifierConfig, path: impl AsRef<Path>) -> Result<Self> {
        let keys = KeyStore::from_path(path)?;
        Ok(Self::new(config, Arc::new(keys)))
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    pub fn public_key(&self) -> Option<&Arc<RsaPublicKey>> {
        self.default_key.as_ref()
    }

    /// Verify `token` and decode its payload as `T`.
    ///
    /// Checks, in order: key resolution, signature, `exp`/`nbf` (and `iss`/`aud`
    /// when configured), the claim type tag, then `T::valid`.
    pub fn verify<T: Claims>(&self, token: &str) -> Result<VerifiedToken<T>> {
        let kid = header_kid(token)?;
        let key = self.resolve_key(kid.as_deref())?;
        let decoding_key = DecodingKey::from_rsa_components(
            &URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
            &URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        )?;

        let data =
            jsonwebtoken::decode::<Map<String, Value>>(token, &decoding_key, &self.validation())?;
        let claims = TypedClaims::<T>::from_json_map(data.claims)?;
        claims.valid()?;

        Ok(VerifiedToken {
            header: data.header,
            kid,
            claims,
        })
    }

    fn resolve_key(&self, kid: Option<&str>) -> Result<Arc<RsaPublicKey>> {
        match kid {
            Some(kid) => self.keys.get_public_key(kid).map_err(|_| {
                tracing::debug!(kid, "no public key for token kid");
                Error::NoPublicKeyFound {
                    kid: Some(kid.to_string()),
                }
            }),
            None => self
                .default_key
                .clone()
                .ok_or(Error::NoPublicKeyFound { kid: None }),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS512);
        validation.algorithms = self.config.algorithms.clone();
        validation.leeway = self.config.leeway;
        validation.validate_nbf = true;

        match &self.config.audience {
            Some(audience) => validation.set_audience(audience.as_slice()),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Read the `kid` from a compact token's header without trusting anything else
/// in it.
///
/// A missing or `null` kid is `None`. Any non-string kid is rejected.
pub fn header_kid(token: &str) -> Result<Option<String>> {
    let (header, _) = token
        .split_once('.')
        .ok_or_else(|| Error::Jwt(ErrorKind::InvalidToken.into()))?;
    let bytes = URL_SAFE_NO_PAD.decode(header)?;
    let header: Map<String, Value> = serde_json::from_slice(&bytes)?;

    match header.get("kid") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(kid)) => Ok(Some(kid.clone())),
        Some(_) => Err(Error::KidInvalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn segment(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json)
    }

    #[test]
    fn test_header_kid() {
        let with_kid = format!("{}.e30.sig", segment(r#"{"alg":"RS512","kid":"key1"}"#));
        assert_eq!(header_kid(&with_kid).unwrap(), Some("key1".to_string()));

        let without = format!("{}.e30.sig", segment(r#"{"alg":"RS512"}"#));
        assert_eq!(header_kid(&without).unwrap(), None);

        let null = format!("{}.e30.sig", segment(r#"{"alg":"RS512","kid":null}"#));
        assert_eq!(header_kid(&null).unwrap(), None);
    }

    #[test]
    fn test_header_kid_rejects_non_string() {
        let numeric = format!("{}.e30.sig", segment(r#"{"alg":"RS512","kid":7}"#));
        assert!(matches!(header_kid(&numeric), Err(Error::KidInvalid)));

        let object = format!("{}.e30.sig", segment(r#"{"alg":"RS512","kid":{"a":1}}"#));
        assert!(matches!(header_kid(&object), Err(Error::KidInvalid)));
    }

    #[test]
    fn test_header_kid_malformed() {
        assert!(matches!(
            header_kid("no-dots"),
            Err(Error::Jwt(e)) if matches!(e.kind(), ErrorKind::InvalidToken)
        ));
        assert!(matches!(header_kid("!!!.e30.sig"), Err(Error::Base64(_))));
        assert!(matches!(
            header_kid(&format!("{}.e30.sig", segment("[1,2]"))),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_no_default_key() {
        let verifier = Verifier::new(VerifierConfig::default(), Arc::new(KeyStore::new()));
        let token = format!("{}.e30.sig", segment(r#"{"alg":"RS512"}"#));

        match verifier.verify::<tessera_core::EmptyClaims>(&token) {
            Err(Error::NoPublicKeyFound { kid: None }) => {}
            other => panic!("expected NoPublicKeyFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kid() {
        let verifier = Verifier::new(VerifierConfig::default(), Arc::new(KeyStore::new()));
        let token = format!("{}.e30.sig", segment(r#"{"alg":"RS512","kid":"ghost"}"#));

        match verifier.verify::<tessera_core::EmptyClaims>(&token) {
            Err(Error::NoPublicKeyFound { kid: Some(kid) }) => assert_eq!(kid, "ghost"),
            other => panic!("expected NoPublicKeyFound, got {other:?}"),
        }
    }

    #[test]
    fn test_default_validation() {
        let verifier = Verifier::new(VerifierConfig::default(), Arc::new(KeyStore::new()));
        let validation = verifier.validation();

        assert!(!validation.validate_aud);
        assert!(validation.validate_nbf);
        assert!(validation.iss.is_none());
        assert_eq!(validation.algorithms.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_header_kid_reads_any_string(kid in ".{0,32}") {
            let header = serde_json::json!({"alg": "RS512", "kid": kid});
            let token = format!("{}.e30.sig", segment(&header.to_string()));

            prop_assert_eq!(header_kid(&token).unwrap(), Some(kid));
        }
    }
}
