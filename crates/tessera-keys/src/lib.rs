//! # Tessera Keys
//!
//! RSA keys addressed by key ID (`kid`).
//!
//! ## Overview
//!
//! A [`KeyStore`] maps kids to [`KeyPair`]s. Signers look up private keys,
//! verifiers look up public keys, and both can share one store behind an
//! `Arc`. A store may be bound to a [`KeyDir`] to load and persist its keys
//! as PEM files named `<kid>.private.pem` and `<kid>.public.pem`.
//!
//! ## Key Concepts
//!
//! - **Public-only pairs**: a kid can be trusted for verification without a
//!   private key
//! - **Fail-fast load**: one unreadable file aborts [`KeyStore::from_dir`]
//! - **Best-effort save**: [`KeyStore::save_keys`] attempts every kid and joins
//!   the errors
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_keys::{generate_private_key, KeyStore, MemoryKeyDir};
//!
//! let dir = Arc::new(MemoryKeyDir::new());
//! let store = KeyStore::with_dir(dir.clone());
//! store.load_private_key("primary", generate_private_key(1024)?);
//! store.save_keys()?;
//!
//! let reloaded = KeyStore::from_dir(dir)?;
//! assert!(reloaded.has_private_key("primary"));
//! # Ok::<(), tessera_keys::KeyError>(())
//! ```

pub mod codec;
pub mod dir;
pub mod error;
pub mod store;

pub use codec::{
    decode_private_key_pem, decode_public_key_pem, encode_private_key_pem, encode_public_key_pem,
    generate_private_key, read_or_create_private_key, read_private_key_file, read_public_key_file,
    write_private_key_file,
};
pub use dir::{FsKeyDir, KeyDir, KeyHalf, KeyLayout, MemoryKeyDir};
pub use error::{KeyError, Result};
pub use store::{KeyPair, KeyStore};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
