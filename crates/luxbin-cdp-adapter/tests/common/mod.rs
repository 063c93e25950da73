/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for luxbin-cdp-adapter tests

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use luxbin_cdp_adapter::{CdpClient, ClientConfig, KeyMaterial};
use p256::SecretKey;
use rand::rngs::OsRng;
use wiremock::MockServer;

pub const TEST_KEY_ID: &str = "organizations/luxbin/apiKeys/test-key";

/// RFC 8410 example Ed25519 private key in PKCS#8 DER, base64-encoded
#[allow(dead_code)]
pub const ED25519_PKCS8_BASE64: &str =
    "MC4CAQAwBQYDK2VwBCIEINTuctv5E1hK1bbY8fdp+K06/nwoy/HU++CXqI9EdVhC";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Fresh P-256 key as base64 SEC1 DER
pub fn generate_sec1_secret() -> String {
    let der = SecretKey::random(&mut OsRng).to_sec1_der().unwrap();
    STANDARD.encode(der.as_slice())
}

pub fn test_key_material() -> KeyMaterial {
    KeyMaterial::from_secret(TEST_KEY_ID, &generate_sec1_secret()).unwrap()
}

#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> CdpClient {
    CdpClient::with_config_and_base_url(test_key_material(), ClientConfig::default(), &server.uri())
        .expect("client init")
}

/// Decode the claims segment of a serialized token
#[allow(dead_code)]
pub fn decode_claims(token: &str) -> serde_json::Value {
    let claims = token.split('.').nth(1).expect("claims segment");
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims).expect("base64url")).expect("json")
}
