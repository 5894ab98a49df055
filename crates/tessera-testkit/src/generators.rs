//! Proptest generators for property-based testing.

use std::time::Duration;

use proptest::prelude::*;

use tessera_perms::PermissionSet;

/// Generate a `service:action` permission.
pub fn permission() -> impl Strategy<Value = String> {
    "[a-z]{1,6}:[a-z]{1,8}".prop_map(String::from)
}

/// Generate a permission set of up to `max_len` permissions.
pub fn permission_set(max_len: usize) -> impl Strategy<Value = PermissionSet> {
    prop::collection::vec(permission(), 0..=max_len).prop_map(PermissionSet::from_iter)
}

/// Generate a key ID.
pub fn kid() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_map(String::from)
}

/// Generate a glob pattern: a permission with a wildcard swapped in.
pub fn pattern() -> impl Strategy<Value = String> {
    (permission(), prop_oneof![Just("*"), Just("?")], any::<prop::sample::Index>()).prop_map(
        |(perm, wildcard, index)| {
            let chars: Vec<char> = perm.chars().collect();
            let at = index.index(chars.len());
            let mut out: String = chars[..at].iter().collect();
            out.push_str(wildcard);
            out.extend(chars[at + 1..].iter());
            out
        },
    )
}

/// Parameters for signing an access token.
#[derive(Debug, Clone)]
pub struct TokenParams {
    pub subject: String,
    pub id: String,
    pub audience: Vec<String>,
    pub duration: Duration,
    pub perms: PermissionSet,
}

impl Arbitrary for TokenParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            "[a-zA-Z0-9]{0,16}",
            "[a-f0-9]{0,32}",
            prop::collection::vec("[a-z]{1,8}", 0..3),
            60u64..=86_400u64,
            permission_set(8),
        )
            .prop_map(|(subject, id, audience, secs, perms)| TokenParams {
                subject,
                id,
                audience,
                duration: Duration::from_secs(secs),
                perms,
            })
            .boxed()
    }
}
