//! The multi-key store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rayon::prelude::*;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::codec::{
    decode_private_key_pem, decode_public_key_pem, encode_private_key_pem, encode_public_key_pem,
};
use crate::dir::{FsKeyDir, KeyDir, KeyHalf, KeyLayout};
use crate::error::{KeyError, Result};

/// The keys known under one kid.
///
/// A private key always comes with its public key. Public-only pairs are
/// trusted for verification but cannot sign.
#[derive(Debug, Clone, Default)]
pub struct KeyPair {
    pub private_key: Option<Arc<RsaPrivateKey>>,
    pub public_key: Option<Arc<RsaPublicKey>>,
}

/// Thread-safe map from kid to [`KeyPair`], optionally bound to a [`KeyDir`].
///
/// Every method is atomic on its own. Keys are handed out as `Arc`s, so
/// removing a kid never affects a key a caller already holds.
#[derive(Debug, Default)]
pub struct KeyStore {
    inner: RwLock<HashMap<String, KeyPair>>,
    dir: Option<Arc<dyn KeyDir>>,
    layout: KeyLayout,
}

impl KeyStore {
    /// Create an empty store with no key directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that saves into `dir`.
    pub fn with_dir(dir: Arc<dyn KeyDir>) -> Self {
        Self::with_dir_and_layout(dir, KeyLayout::default())
    }

    pub fn with_dir_and_layout(dir: Arc<dyn KeyDir>, layout: KeyLayout) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            dir: Some(dir),
            layout,
        }
    }

    /// Load every key file in `dir` using the default layout.
    pub fn from_dir(dir: Arc<dyn KeyDir>) -> Result<Self> {
        Self::from_dir_with_layout(dir, KeyLayout::default())
    }

    /// Load every key file in `dir` whose name ends with one of the layout's
    /// suffixes. Subdirectories are included; the kid is the base file name
    /// minus the suffix.
    ///
    /// Stops at the first file that cannot be read or decoded.
    pub fn from_dir_with_layout(dir: Arc<dyn KeyDir>, layout: KeyLayout) -> Result<Self> {
        let store = Self::with_dir_and_layout(Arc::clone(&dir), layout);

        let mut names = dir.list()?;
        names.sort();

        let mut loaded = 0usize;
        for name in &names {
            let base = name.rsplit('/').next().unwrap_or(name);
            let Some((kid, half)) = store.layout.classify(base) else {
                continue;
            };
            let bytes = dir.read(name)?;
            match half {
                KeyHalf::Private => store.load_private_key(kid, decode_private_key_pem(&bytes)?),
                KeyHalf::Public => store.load_public_key(kid, decode_public_key_pem(&bytes)?),
            }
            loaded += 1;
        }

        tracing::debug!(files = loaded, kids = store.len(), "loaded key directory");
        Ok(store)
    }

    /// Load every key file under a filesystem directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_dir(Arc::new(FsKeyDir::new(path.as_ref())))
    }

    pub fn key_dir(&self) -> Option<Arc<dyn KeyDir>> {
        self.dir.clone()
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, KeyPair>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, KeyPair>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a private key and its public key under `kid`, replacing any
    /// previous pair.
    pub fn load_private_key(&self, kid: impl Into<String>, key: RsaPrivateKey) {
        let kid = kid.into();
        let public = Arc::new(key.to_public_key());
        let pair = KeyPair {
            private_key: Some(Arc::new(key)),
            public_key: Some(public),
        };

        tracing::debug!(kid = %kid, "loaded private key");
        self.write().insert(kid, pair);
    }

    /// Store a public key under `kid`, keeping any private key already there.
    pub fn load_public_key(&self, kid: impl Into<String>, key: RsaPublicKey) {
        let kid = kid.into();
        tracing::debug!(kid = %kid, "loaded public key");
        self.write().entry(kid).or_default().public_key = Some(Arc::new(key));
    }

    /// Forget both halves of `kid`. Removing an unknown kid is a no-op.
    pub fn remove_key(&self, kid: &str) {
        if self.write().remove(kid).is_some() {
            tracing::debug!(kid, "removed key pair");
        }
    }

    /// Forget every key.
    pub fn clear_keys(&self) {
        let mut inner = self.write();
        tracing::debug!(kids = inner.len(), "cleared key store");
        inner.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Every kid in the store, sorted.
    pub fn list_keys(&self) -> Vec<String> {
        let mut kids: Vec<String> = self.read().keys().cloned().collect();
        kids.sort();
        kids
    }

    pub fn get_private_key(&self, kid: &str) -> Result<Arc<RsaPrivateKey>> {
        self.read()
            .get(kid)
            .and_then(|pair| pair.private_key.clone())
            .ok_or_else(|| KeyError::MissingPrivateKey(kid.to_string()))
    }

    pub fn get_public_key(&self, kid: &str) -> Result<Arc<RsaPublicKey>> {
        self.read()
            .get(kid)
            .and_then(|pair| pair.public_key.clone())
            .ok_or_else(|| KeyError::MissingPublicKey(kid.to_string()))
    }

    /// A copy of the whole pair for `kid`.
    pub fn get_key_pair(&self, kid: &str) -> Option<KeyPair> {
        self.read().get(kid).cloned()
    }

    pub fn has_private_key(&self, kid: &str) -> bool {
        self.read()
            .get(kid)
            .is_some_and(|pair| pair.private_key.is_some())
    }

    pub fn has_public_key(&self, kid: &str) -> bool {
        self.read()
            .get(kid)
            .is_some_and(|pair| pair.public_key.is_some())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the pair for `kid` to the store's key directory.
    ///
    /// Does nothing when the store has no directory.
    pub fn save_key(&self, kid: &str) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let pair = self
            .get_key_pair(kid)
            .ok_or_else(|| KeyError::MissingKeyPair(kid.to_string()))?;

        join_errors(write_pair(dir.as_ref(), &self.layout, kid, &pair))?;
        tracing::debug!(kid, "saved key pair");
        Ok(())
    }

    /// Write every pair to the store's key directory.
    ///
    /// Does nothing when the store has no directory. See [`export_to`](Self::export_to).
    pub fn save_keys(&self) -> Result<()> {
        match &self.dir {
            Some(dir) => self.export_to_with_layout(dir.as_ref(), &self.layout),
            None => Ok(()),
        }
    }

    /// Write every pair to `dir` using the default layout.
    pub fn export_to(&self, dir: &dyn KeyDir) -> Result<()> {
        self.export_to_with_layout(dir, &KeyLayout::default())
    }

    /// Write every pair to `dir`, one rayon task per kid.
    ///
    /// Every kid is attempted. All failures are returned together as
    /// [`KeyError::Joined`].
    pub fn export_to_with_layout(&self, dir: &dyn KeyDir, layout: &KeyLayout) -> Result<()> {
        let snapshot: Vec<(String, KeyPair)> = self
            .read()
            .iter()
            .map(|(kid, pair)| (kid.clone(), pair.clone()))
            .collect();

        let errors: Vec<KeyError> = snapshot
            .par_iter()
            .flat_map_iter(|(kid, pair)| write_pair(dir, layout, kid, pair))
            .collect();

        tracing::debug!(
            kids = snapshot.len(),
            failed = errors.len(),
            "saved key directory"
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(KeyError::Joined(errors))
        }
    }
}

/// Write both halves of a pair, attempting each one even if the other fails.
fn write_pair(dir: &dyn KeyDir, layout: &KeyLayout, kid: &str, pair: &KeyPair) -> Vec<KeyError> {
    let mut errors = Vec::new();
    if let Some(private) = &pair.private_key {
        let written = encode_private_key_pem(private)
            .and_then(|pem| dir.write(&layout.private_file(kid), &pem));
        errors.extend(written.err());
    }
    if let Some(public) = &pair.public_key {
        let written = encode_public_key_pem(public)
            .and_then(|pem| dir.write(&layout.public_file(kid), &pem));
        errors.extend(written.err());
    }
    errors
}

fn join_errors(mut errors: Vec<KeyError>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(KeyError::Joined(errors)),
    }
}
