//! # Tessera Testkit
//!
//! Testing utilities for Tessera.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: cached RSA keys, ready-made issuers and verifiers, and
//!   payload types for type-tag tests
//! - **Generators**: Proptest strategies for permissions, kids and token parameters
//!
//! Generating RSA keys is slow, so [`fixtures::test_key`] hands out clones of a
//! small pool of 2048-bit keys generated once per process.
//!
//! ## Test Fixtures
//!
//! ```rust
//! use tessera_testkit::fixtures::{GreetingClaims, TestFixture};
//!
//! let fixture = TestFixture::with_kids(&["k1"]);
//! let token = fixture.sign_greeting("k1", "hello").unwrap();
//! let verified = fixture.verifier().verify::<GreetingClaims>(&token).unwrap();
//! assert_eq!(verified.claims.claims.value, "hello");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tessera_testkit::generators::permission_set;
//!
//! proptest! {
//!     #[test]
//!     fn dump_is_sorted(perms in permission_set(16)) {
//!         let dump = perms.dump();
//!         prop_assert!(dump.windows(2).all(|w| w[0] < w[1]));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    init_tracing, test_key, with_header, FarewellClaims, GreetingClaims, TestFixture,
};
pub use generators::{kid, pattern, permission, permission_set, TokenParams};
