//! # Tessera Permissions
//!
//! Permission sets carried inside access tokens.
//!
//! ## Overview
//!
//! A [`PermissionSet`] is a set of namespaced permission strings such as
//! `"svc:read"`. Besides exact membership tests it supports glob-style
//! searching, where `*` matches any run of characters (including none) and
//! `?` matches exactly one character.
//!
//! ## Key Concepts
//!
//! - **Exact checks**: [`PermissionSet::has`] and [`PermissionSet::one_of`]
//!   compare whole strings, wildcards are never interpreted there
//! - **Search**: [`PermissionSet::search`] returns every member matching a pattern
//! - **Filter**: [`PermissionSet::filter`] builds a new set from several patterns
//!
//! ## Serialization
//!
//! Sets serialize as a sorted sequence, so JSON and YAML output is stable
//! regardless of insertion order.
//!
//! ## Usage
//!
//! ```rust
//! use tessera_perms::PermissionSet;
//!
//! let perms = PermissionSet::parse("svc:read svc:write admin:users");
//! assert!(perms.has("svc:read"));
//!
//! let svc = perms.filter(["svc:*"]);
//! assert_eq!(svc.dump(), vec!["svc:read", "svc:write"]);
//! ```

pub mod matcher;
pub mod set;

pub use matcher::wildcard_match;
pub use set::PermissionSet;
