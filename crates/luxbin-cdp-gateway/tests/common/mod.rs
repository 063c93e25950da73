/*
[INPUT]:  Mock upstream server and generated CDP keys
[OUTPUT]: Proxy state wired to a mock CDP, response body helpers
[POS]:    Test infrastructure - shared across gateway test modules
[UPDATE]: When handler state or key fixtures change
*/

use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use luxbin_cdp_adapter::{CdpClient, ClientConfig, KeyMaterial};
use luxbin_cdp_gateway::AppState;
use p256::SecretKey;
use rand::rngs::OsRng;
use serde_json::Value;
use wiremock::MockServer;

pub const TEST_KEY_ID: &str = "organizations/luxbin/apiKeys/gateway-test";

/// Fresh P-256 key as base64 SEC1 DER
pub fn generate_sec1_secret() -> String {
    let der = SecretKey::random(&mut OsRng).to_sec1_der().unwrap();
    STANDARD.encode(der.as_slice())
}

#[allow(dead_code)]
pub fn state_for(server: &MockServer) -> AppState {
    let key = KeyMaterial::from_secret(TEST_KEY_ID, &generate_sec1_secret()).unwrap();
    let client =
        CdpClient::with_config_and_base_url(key, ClientConfig::default(), &server.uri())
            .expect("client init");
    AppState::new(client)
}

/// Status and decoded JSON body of a handler result
#[allow(dead_code)]
pub async fn into_parts(result: impl IntoResponse) -> (u16, Value) {
    let response: Response = result.into_response();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}
