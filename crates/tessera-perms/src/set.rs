//! The permission set.

use std::collections::HashSet;
use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::matcher::wildcard_match;

/// A set of unique permission strings.
///
/// Membership is exact; [`search`](Self::search) and [`filter`](Self::filter)
/// interpret glob patterns. Serializes as a lexicographically sorted sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    values: HashSet<String>,
}

impl PermissionSet {
    /// Create an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace-separated list of permissions.
    pub fn parse(perms: &str) -> Self {
        perms.split_whitespace().collect()
    }

    /// Add a permission. Adding an existing permission is a no-op.
    pub fn set(&mut self, perm: impl Into<String>) {
        self.values.insert(perm.into());
    }

    /// Remove a permission. Removing a missing permission is a no-op.
    pub fn clear(&mut self, perm: &str) {
        self.values.remove(perm);
    }

    /// Check whether the exact permission is present.
    pub fn has(&self, perm: &str) -> bool {
        self.values.contains(perm)
    }

    /// Check whether any permission of `other` is also in this set.
    pub fn one_of(&self, other: &PermissionSet) -> bool {
        other.values.iter().any(|perm| self.has(perm))
    }

    /// All permissions in lexicographic order.
    pub fn dump(&self) -> Vec<String> {
        let mut perms: Vec<String> = self.values.iter().cloned().collect();
        perms.sort();
        perms
    }

    /// All permissions matching a glob pattern, in no particular order.
    pub fn search(&self, pattern: &str) -> Vec<String> {
        self.values
            .iter()
            .filter(|perm| wildcard_match(pattern, perm))
            .cloned()
            .collect()
    }

    /// Build a new set holding every permission matched by at least one pattern.
    pub fn filter<I, S>(&self, patterns: I) -> PermissionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = PermissionSet::new();
        for pattern in patterns {
            out.extend(self.search(pattern.as_ref()));
        }
        out
    }

    /// Number of permissions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set holds no permissions.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the permissions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl FromStr for PermissionSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for PermissionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.values.extend(iter.into_iter().map(Into::into));
    }
}

impl Serialize for PermissionSet {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        serializer.collect_seq(self.dump())
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let perms = Option::<Vec<String>>::deserialize(deserializer)?;
        Ok(perms.into_iter().flatten().collect())
    }
}
