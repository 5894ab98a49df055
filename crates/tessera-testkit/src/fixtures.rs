//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use tessera::{Audience, Issuer, IssuerConfig, KeyStore, Verifier, VerifierConfig};
use tessera_core::{Claims, ClaimsError};
use tessera_keys::{generate_private_key, RsaPrivateKey};

/// Size of the cached test keys.
pub const TEST_KEY_BITS: usize = 2048;

const POOL_SIZE: usize = 4;

/// One of a small pool of RSA keys, generated once per process.
///
/// `index` wraps around the pool, so distinct indices below the pool size
/// give distinct keys.
pub fn test_key(index: usize) -> RsaPrivateKey {
    static POOL: OnceLock<Vec<RsaPrivateKey>> = OnceLock::new();
    let pool = POOL.get_or_init(|| {
        (0..POOL_SIZE)
            .map(|_| generate_private_key(TEST_KEY_BITS).expect("generate test key"))
            .collect()
    });
    pool[index % POOL_SIZE].clone()
}

/// Route `tracing` output at debug level to the test harness. Safe to call
/// from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::DEBUG)
        .try_init();
}

/// A payload that is valid only when `value` is `"hello"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingClaims {
    #[serde(rename = "TestValue")]
    pub value: String,
}

impl Claims for GreetingClaims {
    const CLAIM_TYPE: &'static str = "greeting-claims";

    fn valid(&self) -> tessera_core::Result<()> {
        match self.value.as_str() {
            "hello" => Ok(()),
            other => Err(ClaimsError::invalid(format!("unexpected greeting {other:?}"))),
        }
    }
}

/// Same wire shape as [`GreetingClaims`] with a different tag. Valid only when
/// `value` is `"world"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarewellClaims {
    #[serde(rename = "TestValue")]
    pub value: String,
}

impl Claims for FarewellClaims {
    const CLAIM_TYPE: &'static str = "farewell-claims";

    fn valid(&self) -> tessera_core::Result<()> {
        match self.value.as_str() {
            "world" => Ok(()),
            other => Err(ClaimsError::invalid(format!("unexpected farewell {other:?}"))),
        }
    }
}

/// A key store preloaded with test keys and an issuer without a default key.
pub struct TestFixture {
    pub keys: Arc<KeyStore>,
    pub issuer: Issuer,
}

impl TestFixture {
    /// Fixture with an empty key store.
    pub fn new() -> Self {
        Self::with_kids(&[])
    }

    /// Fixture whose store holds a private key for each kid, in pool order.
    pub fn with_kids(kids: &[&str]) -> Self {
        let keys = Arc::new(KeyStore::new());
        for (index, kid) in kids.iter().enumerate() {
            keys.load_private_key(*kid, test_key(index));
        }
        let issuer = Issuer::new(Self::issuer_config(), Arc::clone(&keys));
        Self { keys, issuer }
    }

    /// Issuer configuration that keeps generated keys small.
    pub fn issuer_config() -> IssuerConfig {
        IssuerConfig {
            key_bits: TEST_KEY_BITS,
            ..IssuerConfig::new("tessera-test")
        }
    }

    /// Verifier sharing the fixture's key store.
    pub fn verifier(&self) -> Verifier {
        Verifier::new(VerifierConfig::default(), Arc::clone(&self.keys))
    }

    /// Sign a one-hour [`GreetingClaims`] token with `kid`.
    pub fn sign_greeting(&self, kid: &str, value: &str) -> tessera::Result<String> {
        self.issuer.sign_with_kid(
            "1",
            "test",
            Audience::new(),
            Duration::from_secs(3600),
            GreetingClaims {
                value: value.to_string(),
            },
            kid,
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace a token's header with `header` while keeping payload and signature.
pub fn with_header(token: &str, header: &serde_json::Value) -> String {
    let rest = token.split_once('.').map(|(_, rest)| rest).unwrap_or("");
    format!("{}.{rest}", URL_SAFE_NO_PAD.encode(header.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_keys_are_distinct() {
        assert_eq!(test_key(0), test_key(POOL_SIZE));
        assert_ne!(test_key(0), test_key(1));
    }

    #[test]
    fn test_fixture_kids() {
        let fixture = TestFixture::with_kids(&["a", "b"]);

        assert!(fixture.keys.has_private_key("a"));
        assert!(fixture.keys.has_private_key("b"));
        assert!(fixture.issuer.kid().is_none());
    }

    #[test]
    fn test_greeting_rules() {
        let hello = GreetingClaims {
            value: "hello".into(),
        };
        let world = FarewellClaims {
            value: "world".into(),
        };

        assert!(hello.valid().is_ok());
        assert!(world.valid().is_ok());
        assert!(GreetingClaims {
            value: "world".into()
        }
        .valid()
        .is_err());
    }

    #[test]
    fn test_with_header() {
        let replaced = with_header("aaa.bbb.ccc", &serde_json::json!({"alg": "RS512"}));
        assert!(replaced.ends_with(".bbb.ccc"));
        assert_eq!(tessera::header_kid(&replaced).unwrap(), None);
    }
}
