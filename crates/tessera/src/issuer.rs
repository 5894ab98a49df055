//! Token issuance.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;

use tessera_core::{Audience, Claims, TypedClaims};
use tessera_keys::{
    generate_private_key, read_or_create_private_key, read_private_key_file, KeyError, KeyStore,
};

use crate::error::{Error, Result};
use crate::verifier::{Verifier, VerifierConfig};

/// Configuration for an [`Issuer`].
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Written to the `iss` claim of every token.
    pub name: String,
    /// Signature algorithm. Must be an RSA algorithm.
    pub algorithm: Algorithm,
    /// Size of keys generated by [`Issuer::with_kid`] and
    /// [`Issuer::from_file_or_create`].
    pub key_bits: usize,
}

impl IssuerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            algorithm: Algorithm::RS512,
            key_bits: 4096,
        }
    }
}

#[derive(Debug, Clone)]
enum DefaultKey {
    None,
    Kid(String),
    Key(Arc<RsaPrivateKey>),
}

/// Signs typed claims with keys from a shared [`KeyStore`].
///
/// An issuer may have a default key, either a kid in its store or a key held
/// directly. Tokens signed with a kid carry it in the `kid` header; tokens
/// signed with a directly held key carry no `kid`.
#[derive(Debug, Clone)]
pub struct Issuer {
    config: IssuerConfig,
    keys: Arc<KeyStore>,
    default_key: DefaultKey,
}

impl Issuer {
    /// Issuer without a default key. Every signature needs an explicit kid.
    pub fn new(config: IssuerConfig, keys: Arc<KeyStore>) -> Self {
        Self {
            config,
            keys,
            default_key: DefaultKey::None,
        }
    }

    /// Issuer whose default key is `key`, used without a `kid` header.
    pub fn with_private_key(config: IssuerConfig, key: RsaPrivateKey, keys: Arc<KeyStore>) -> Self {
        Self {
            config,
            keys,
            default_key: DefaultKey::Key(Arc::new(key)),
        }
    }

    /// Issuer whose default key is `kid` in `keys`.
    ///
    /// When the store has no private key for `kid`, a new key of
    /// `config.key_bits` is generated, loaded and saved to the store's key
    /// directory.
    pub fn with_kid(
        config: IssuerConfig,
        kid: impl Into<String>,
        keys: Arc<KeyStore>,
    ) -> Result<Self> {
        let kid = kid.into();
        if !keys.has_private_key(&kid) {
            tracing::debug!(kid = %kid, bits = config.key_bits, "generating missing signing key");
            let key = generate_private_key(config.key_bits)?;
            keys.load_private_key(kid.as_str(), key);
            keys.save_key(&kid)?;
        }

        Ok(Self {
            config,
            keys,
            default_key: DefaultKey::Kid(kid),
        })
    }

    /// Issuer with an optional default key file and an optional key directory.
    pub fn from_files(
        config: IssuerConfig,
        private_key_file: Option<&Path>,
        key_dir: Option<&Path>,
    ) -> Result<Self> {
        let keys = match key_dir {
            Some(dir) => KeyStore::from_path(dir)?,
            None => KeyStore::new(),
        };
        let keys = Arc::new(keys);

        match private_key_file {
            Some(path) => {
                let key = read_private_key_file(path)?;
                Ok(Self::with_private_key(config, key, keys))
            }
            None => Ok(Self::new(config, keys)),
        }
    }

    /// Issuer whose default key lives at `path`, generated and written there
    /// first if the file does not exist.
    pub fn from_file_or_create(config: IssuerConfig, path: impl AsRef<Path>) -> Result<Self> {
        let key = read_or_create_private_key(path, config.key_bits)?;
        Ok(Self::with_private_key(config, key, Arc::new(KeyStore::new())))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// The kid of the default key, if it is a store key.
    pub fn kid(&self) -> Option<&str> {
        match &self.default_key {
            DefaultKey::Kid(kid) => Some(kid.as_str()),
            _ => None,
        }
    }

    /// Sign `claims` with the default key.
    pub fn sign<T: Claims>(
        &self,
        subject: impl Into<String>,
        id: impl Into<String>,
        audience: impl Into<Audience>,
        duration: Duration,
        claims: T,
    ) -> Result<String> {
        let wrapped = TypedClaims::wrap(&self.config.name, subject, id, audience, duration, claims);
        self.sign_claims(&wrapped)
    }

    /// Sign `claims` with the private key stored under `kid`.
    pub fn sign_with_kid<T: Claims>(
        &self,
        subject: impl Into<String>,
        id: impl Into<String>,
        audience: impl Into<Audience>,
        duration: Duration,
        claims: T,
        kid: &str,
    ) -> Result<String> {
        let wrapped = TypedClaims::wrap(&self.config.name, subject, id, audience, duration, claims);
        self.sign_claims_with_kid(&wrapped, kid)
    }

    /// Sign a prebuilt envelope with the default key.
    pub fn sign_claims<T: Claims>(&self, claims: &TypedClaims<T>) -> Result<String> {
        self.sign_raw(&claims.to_json_map()?, None)
    }

    /// Sign a prebuilt envelope with the private key stored under `kid`.
    pub fn sign_claims_with_kid<T: Claims>(
        &self,
        claims: &TypedClaims<T>,
        kid: &str,
    ) -> Result<String> {
        self.sign_raw(&claims.to_json_map()?, Some(kid))
    }

    /// Sign any serializable claims. `kid` picks a store key, `None` the
    /// default key.
    pub fn sign_raw<C: Serialize>(&self, claims: &C, kid: Option<&str>) -> Result<String> {
        let (kid, key) = self.signing_key(kid)?;
        let der = key.to_pkcs1_der().map_err(KeyError::from)?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

        let mut header = Header::new(self.config.algorithm);
        header.kid = kid;
        Ok(jsonwebtoken::encode(&header, claims, &encoding_key)?)
    }

    fn signing_key(&self, kid: Option<&str>) -> Result<(Option<String>, Arc<RsaPrivateKey>)> {
        if let Some(kid) = kid {
            return Ok((Some(kid.to_string()), self.keys.get_private_key(kid)?));
        }
        match &self.default_key {
            DefaultKey::Kid(kid) => Ok((Some(kid.clone()), self.keys.get_private_key(kid)?)),
            DefaultKey::Key(key) => Ok((None, Arc::clone(key))),
            DefaultKey::None => Err(Error::NoSigningKey),
        }
    }

    /// The default private key.
    pub fn private_key(&self) -> Result<Arc<RsaPrivateKey>> {
        self.signing_key(None).map(|(_, key)| key)
    }

    /// The public half of the default key.
    pub fn public_key(&self) -> Result<RsaPublicKey> {
        Ok(self.private_key()?.to_public_key())
    }

    /// A verifier sharing this issuer's key store and trusting its default key.
    pub fn verifier(&self) -> Verifier {
        let config = VerifierConfig::default();
        match &self.default_key {
            DefaultKey::Key(key) => Verifier::with_shared_public_key(
                config,
                Arc::new(key.to_public_key()),
                Arc::clone(&self.keys),
            ),
            _ => Verifier::new(config, Arc::clone(&self.keys)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use tessera_core::{ClaimsError, EmptyClaims};
    use tessera_keys::MemoryKeyDir;

    fn test_key() -> RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| generate_private_key(2048).unwrap()).clone()
    }

    fn config() -> IssuerConfig {
        IssuerConfig {
            key_bits: 2048,
            ..IssuerConfig::new("issuer")
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = IssuerConfig::default();
        assert_eq!(config.algorithm, Algorithm::RS512);
        assert_eq!(config.key_bits, 4096);
        assert_eq!(IssuerConfig::new("auth").name, "auth");
    }

    #[test]
    fn test_no_signing_key() {
        let issuer = Issuer::new(config(), Arc::new(KeyStore::new()));

        let result = issuer.sign(
            "1",
            "a",
            Audience::new(),
            Duration::from_secs(60),
            EmptyClaims {},
        );
        assert!(matches!(result, Err(Error::NoSigningKey)));
        assert!(matches!(issuer.private_key(), Err(Error::NoSigningKey)));
    }

    #[test]
    fn test_missing_kid() {
        let issuer = Issuer::new(config(), Arc::new(KeyStore::new()));

        let result = issuer.sign_with_kid(
            "1",
            "a",
            Audience::new(),
            Duration::from_secs(60),
            EmptyClaims {},
            "k9",
        );
        match result {
            Err(Error::Key(KeyError::MissingPrivateKey(kid))) => assert_eq!(kid, "k9"),
            other => panic!("expected missing key, got {other:?}"),
        }
    }

    #[test]
    fn test_with_kid_reuses_existing_key() {
        let keys = Arc::new(KeyStore::new());
        keys.load_private_key("key1", test_key());

        let issuer = Issuer::with_kid(config(), "key1", keys).unwrap();
        assert_eq!(issuer.kid(), Some("key1"));
        assert_eq!(*issuer.private_key().unwrap(), test_key());
    }

    #[test]
    fn test_with_kid_generates_and_saves() {
        let dir = Arc::new(MemoryKeyDir::new());
        let keys = Arc::new(KeyStore::with_dir(dir.clone()));

        let issuer = Issuer::with_kid(config(), "fresh", keys).unwrap();
        assert!(issuer.key_store().has_private_key("fresh"));
        assert_eq!(
            tessera_keys::KeyDir::list(dir.as_ref()).unwrap(),
            vec!["fresh.private.pem", "fresh.public.pem"]
        );
    }

    #[test]
    fn test_default_key_token_has_no_kid() {
        let issuer = Issuer::with_private_key(config(), test_key(), Arc::new(KeyStore::new()));
        let token = issuer
            .sign("1", "a", Audience::new(), Duration::from_secs(60), EmptyClaims {})
            .unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS512);
        assert!(header.kid.is_none());

        let verified = issuer.verifier().verify::<EmptyClaims>(&token).unwrap();
        assert_eq!(verified.claims.issuer(), "issuer");
        assert!(verified.kid.is_none());
    }

    #[test]
    fn test_sign_rejects_payload_collision() {
        #[derive(Serialize, serde::Deserialize)]
        struct Shadow {
            iss: String,
        }

        impl Claims for Shadow {
            const CLAIM_TYPE: &'static str = "shadow";
        }

        let issuer = Issuer::with_private_key(config(), test_key(), Arc::new(KeyStore::new()));
        let result = issuer.sign(
            "1",
            "a",
            Audience::new(),
            Duration::from_secs(60),
            Shadow { iss: "x".into() },
        );

        match result {
            Err(Error::Claims(ClaimsError::ClaimCollision(key))) => assert_eq!(key, "iss"),
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_sign_raw_with_kid() {
        let keys = Arc::new(KeyStore::new());
        keys.load_private_key("raw", test_key());
        let issuer = Issuer::new(config(), keys);

        let token = issuer
            .sign_raw(&serde_json::json!({"exp": 4_000_000_000u64}), Some("raw"))
            .unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("raw"));
    }
}
