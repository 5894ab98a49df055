//! Sign and verify through the public API, the way a service would.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use tessera::auth::{
    create_access_token, create_access_token_with_kid, create_refresh_token_with_kid,
    create_token_pair, AccessTokenClaims, RefreshTokenClaims,
};
use tessera::{
    Audience, EmptyClaims, Issuer, KeyStore, PermissionSet, Verifier, VerifierConfig,
};
use tessera_testkit::{test_key, GreetingClaims, TestFixture, TokenParams};

#[test]
fn test_access_token_round_trip() {
    let keys = Arc::new(KeyStore::new());
    keys.load_private_key("key1", test_key(0));
    let issuer = Issuer::with_kid(TestFixture::issuer_config(), "key1", Arc::clone(&keys)).unwrap();

    let mut perms = PermissionSet::new();
    perms.set("svc:read");
    perms.set("svc:write");

    let token = create_access_token(&issuer, "1", "test", Audience::new(), perms).unwrap();

    let verifier = Verifier::new(VerifierConfig::default(), keys);
    let verified = verifier.verify::<AccessTokenClaims>(&token).unwrap();

    assert_eq!(verified.kid.as_deref(), Some("key1"));
    assert_eq!(verified.claims.subject(), "1");
    assert_eq!(verified.claims.id(), "test");
    assert_eq!(verified.claims.issuer(), "tessera-test");
    assert!(verified.claims.claims.perms.has("svc:read"));
    assert!(verified.claims.claims.perms.has("svc:write"));
    assert!(!verified.claims.claims.perms.has("svc:delete"));
}

#[test]
fn test_access_token_lifetime_defaults_to_fifteen_minutes() {
    let fixture = TestFixture::with_kids(&["k1"]);
    let token =
        create_access_token_with_kid(&fixture.issuer, "1", "a", "web", PermissionSet::new(), "k1")
            .unwrap();

    let verified = fixture.verifier().verify::<AccessTokenClaims>(&token).unwrap();
    let registered = &verified.claims.registered;
    let lifetime = registered.expires_at.unwrap() - registered.issued_at.unwrap();

    assert_eq!(lifetime, 15 * 60);
    assert_eq!(registered.not_before, registered.issued_at);
    assert!(verified.claims.audience().contains("web"));
}

#[test]
fn test_token_pair_links_refresh_to_access() {
    let issuer = Issuer::with_private_key(
        TestFixture::issuer_config(),
        test_key(1),
        Arc::new(KeyStore::new()),
    );
    let verifier = issuer.verifier();

    let pair = create_token_pair(
        &issuer,
        "user-7",
        "access-id",
        "refresh-id",
        "api",
        "auth",
        PermissionSet::parse("svc:read"),
    )
    .unwrap();

    let access = verifier.verify::<AccessTokenClaims>(&pair.access).unwrap();
    let refresh = verifier.verify::<RefreshTokenClaims>(&pair.refresh).unwrap();

    assert_eq!(access.claims.id(), "access-id");
    assert_eq!(refresh.claims.id(), "refresh-id");
    assert_eq!(refresh.claims.claims.access_token_id, access.claims.id());
    assert!(refresh.claims.audience().contains("auth"));

    let registered = &refresh.claims.registered;
    let lifetime = registered.expires_at.unwrap() - registered.issued_at.unwrap();
    assert_eq!(lifetime, 7 * 24 * 60 * 60);

    // Each token only decodes as its own kind.
    assert!(verifier.verify::<RefreshTokenClaims>(&pair.access).is_err());
    assert!(verifier.verify::<AccessTokenClaims>(&pair.refresh).is_err());
}

#[test]
fn test_refresh_token_with_kid() {
    let fixture = TestFixture::with_kids(&["k1", "k2"]);
    let token =
        create_refresh_token_with_kid(&fixture.issuer, "1", "r", "a", Audience::new(), "k2")
            .unwrap();

    let verified = fixture.verifier().verify::<RefreshTokenClaims>(&token).unwrap();
    assert_eq!(verified.kid.as_deref(), Some("k2"));
    assert_eq!(verified.claims.claims.access_token_id, "a");
}

#[test]
fn test_user_id_survives_round_trip() {
    let fixture = TestFixture::with_kids(&["k1"]);
    let claims = AccessTokenClaims::new(PermissionSet::parse("a:b")).with_user_id("u-42");
    let token = fixture
        .issuer
        .sign_with_kid("1", "x", Audience::new(), Duration::from_secs(60), claims, "k1")
        .unwrap();

    let verified = fixture.verifier().verify::<AccessTokenClaims>(&token).unwrap();
    assert_eq!(verified.claims.claims.user_id.as_deref(), Some("u-42"));
}

#[test]
fn test_empty_claims_round_trip() {
    let fixture = TestFixture::with_kids(&["k1"]);
    let token = fixture
        .issuer
        .sign_with_kid("s", "i", Audience::new(), Duration::from_secs(60), EmptyClaims {}, "k1")
        .unwrap();

    let verified = fixture.verifier().verify::<EmptyClaims>(&token).unwrap();
    assert_eq!(verified.claims.claim_type, "empty-claims");
}

#[test]
fn test_concurrent_signing_against_one_store() {
    let fixture = Arc::new(TestFixture::with_kids(&["k1", "k2"]));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let fixture = Arc::clone(&fixture);
            scope.spawn(move || {
                let kid = if worker % 2 == 0 { "k1" } else { "k2" };
                for _ in 0..5 {
                    let token = fixture.sign_greeting(kid, "hello").unwrap();
                    let verified = fixture.verifier().verify::<GreetingClaims>(&token).unwrap();
                    assert_eq!(verified.kid.as_deref(), Some(kid));
                }
            });
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_signed_tokens_round_trip(params: TokenParams) {
        let fixture = TestFixture::with_kids(&["k1"]);
        let token = fixture.issuer.sign_with_kid(
            params.subject.as_str(),
            params.id.as_str(),
            params.audience.clone(),
            params.duration,
            AccessTokenClaims::new(params.perms.clone()),
            "k1",
        ).unwrap();

        let verified = fixture.verifier().verify::<AccessTokenClaims>(&token).unwrap();
        prop_assert_eq!(verified.claims.subject(), params.subject.as_str());
        prop_assert_eq!(verified.claims.id(), params.id.as_str());
        prop_assert_eq!(verified.claims.audience().as_slice(), params.audience.as_slice());
        prop_assert_eq!(&verified.claims.claims.perms, &params.perms);
    }
}
