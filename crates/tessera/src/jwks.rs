//! JSON Web Key Set export.

use std::io::Write;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::issuer::Issuer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    Sig,
}

/// An RSA public key in JWK form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub alg: String,
    #[serde(rename = "use")]
    pub use_field: KeyUse,
    pub n: String,
    pub e: String,
}

impl Jwk {
    /// Signature JWK for an RSA public key.
    pub fn from_rsa(key: &RsaPublicKey, kid: Option<String>, alg: jsonwebtoken::Algorithm) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid,
            alg: format!("{alg:?}"),
            use_field: KeyUse::Sig,
            n: URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// One JWK per issuer, built from each issuer's default key.
///
/// Fails on the first issuer without a default key.
pub fn jwk_set(issuers: &[&Issuer]) -> Result<JwkSet> {
    let keys = issuers
        .iter()
        .map(|issuer| {
            let public = issuer.public_key()?;
            Ok(Jwk::from_rsa(
                &public,
                issuer.kid().map(str::to_string),
                issuer.algorithm(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(JwkSet { keys })
}

/// Write the JWK set of `issuers` as indented JSON followed by a newline.
pub fn write_jwk_set_json<W: Write>(mut writer: W, issuers: &[&Issuer]) -> Result<()> {
    let set = jwk_set(issuers)?;
    serde_json::to_writer_pretty(&mut writer, &set)?;
    writeln!(writer)?;
    Ok(())
}
