/*
[INPUT]:  Generated P-256 keys and secret provider fixtures
[OUTPUT]: Test results for key loading and token signing
[POS]:    Integration tests - authentication
[UPDATE]: When key formats or token claims change
*/

mod common;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use common::{ED25519_PKCS8_BASE64, TEST_KEY_ID, generate_sec1_secret, test_key_material};
use luxbin_cdp_adapter::auth::key::{KEY_ID_ENV, KEY_SECRET_ENV};
use luxbin_cdp_adapter::{
    CdpError, KeyMaterial, KeyMaterialLoader, RequestBinding, StaticSecretProvider, TokenSigner,
};
use rstest::rstest;
use tokio_test::assert_ok;

#[rstest]
#[case("GET", "api.cdp.coinbase.com", "/onramp/v1/buy/options")]
#[case("POST", "api.cdp.coinbase.com", "/onramp/v1/buy/quote")]
#[case("POST", "api.cdp.coinbase.com", "/platform/v2/data/webhooks/subscriptions")]
#[case("DELETE", "127.0.0.1:8080", "/")]
fn test_signed_token_verifies(#[case] method: &str, #[case] host: &str, #[case] path: &str) {
    let key = test_key_material();
    let signer = TokenSigner::new();
    let verifying_key = assert_ok!(signer.preflight(&key));

    let token = assert_ok!(signer.sign(&key, &RequestBinding::new(method, host, path)));
    let verified = assert_ok!(TokenSigner::verify(&verifying_key, &token));

    assert_eq!(
        verified.claims.uri,
        Some(format!("{method} {host}{path}"))
    );
}

#[test]
fn test_signature_is_always_64_raw_bytes() {
    let key = test_key_material();
    let binding = RequestBinding::new("GET", "api.cdp.coinbase.com", "/onramp/v1/buy/options");
    for _ in 0..64 {
        let token = assert_ok!(TokenSigner::new().sign(&key, &binding));
        let signature = token.rsplit('.').next().unwrap();
        assert_eq!(URL_SAFE_NO_PAD.decode(signature).unwrap().len(), 64);
    }
}

#[test]
fn test_tokens_in_the_same_second_differ() {
    let key = test_key_material();
    let binding = RequestBinding::new("GET", "api.cdp.coinbase.com", "/onramp/v1/buy/options");
    let now = Utc::now();

    let first = assert_ok!(TokenSigner::new().mint_at(&key, &binding, now));
    let second = assert_ok!(TokenSigner::new().mint_at(&key, &binding, now));

    assert_eq!(first.claims.nbf, second.claims.nbf);
    assert_ne!(first.header.nonce, second.header.nonce);
    assert_ne!(first.as_str(), second.as_str());
}

#[test]
fn test_freshness_window_is_120_seconds() {
    let key = test_key_material();
    let binding = RequestBinding::new("GET", "api.cdp.coinbase.com", "/");
    let token = assert_ok!(TokenSigner::new().mint(&key, &binding));
    assert_eq!(token.claims.exp - token.claims.nbf, 120);
    assert_eq!(token.claims.sub, TEST_KEY_ID);
}

#[test]
fn test_loader_rejects_non_base64_secret() {
    let provider = StaticSecretProvider::new()
        .with(KEY_ID_ENV, TEST_KEY_ID)
        .with(KEY_SECRET_ENV, "this is not base64 or pem!");
    let result = KeyMaterialLoader::new(provider).load();
    assert!(matches!(result, Err(CdpError::Configuration(_))));
}

#[rstest]
#[case(None, Some("secret"))]
#[case(Some(TEST_KEY_ID), None)]
#[case(Some("   "), Some("secret"))]
#[case(Some(TEST_KEY_ID), Some(""))]
fn test_loader_rejects_missing_values(#[case] key_id: Option<&str>, #[case] secret: Option<&str>) {
    let mut provider = StaticSecretProvider::new();
    if let Some(key_id) = key_id {
        provider = provider.with(KEY_ID_ENV, key_id);
    }
    if let Some(secret) = secret {
        provider = provider.with(KEY_SECRET_ENV, secret);
    }
    let result = KeyMaterialLoader::new(provider).load();
    assert!(matches!(result, Err(CdpError::Configuration(_))));
}

#[test]
fn test_loader_accepts_sec1_secret() {
    let provider = StaticSecretProvider::new()
        .with(KEY_ID_ENV, TEST_KEY_ID)
        .with(KEY_SECRET_ENV, generate_sec1_secret());
    let key = assert_ok!(KeyMaterialLoader::new(provider).load());
    assert_eq!(key.key_id(), TEST_KEY_ID);
}

#[test]
fn test_non_ec_key_fails_signing_without_fallback() {
    let key = assert_ok!(KeyMaterial::from_secret(TEST_KEY_ID, ED25519_PKCS8_BASE64));
    let binding = RequestBinding::new("GET", "api.cdp.coinbase.com", "/");

    assert!(matches!(
        TokenSigner::new().sign(&key, &binding),
        Err(CdpError::Signing(_))
    ));
    assert!(matches!(
        TokenSigner::new().preflight(&key),
        Err(CdpError::Signing(_))
    ));
}
