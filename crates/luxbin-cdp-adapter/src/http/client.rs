/*
[INPUT]:  HTTP configuration (base URL, timeouts) and CDP key material
[OUTPUT]: Authenticated JSON requests against the CDP REST API
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Instrument, debug, debug_span, warn};

use crate::auth::{KeyMaterial, RequestBinding, TokenSigner};
use crate::http::{CdpError, Result};

/// Base URL for the CDP REST API
pub const DEFAULT_BASE_URL: &str = "https://api.cdp.coinbase.com";

const USER_AGENT: &str = concat!("luxbin-cdp-adapter/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
///
/// The timeout stays well under the 120s token window so a slow upstream
/// never pushes a caller-level retry past token expiry.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Main HTTP client for the CDP API
#[derive(Debug)]
pub struct CdpClient {
    http_client: Client,
    base_url: Url,
    key_material: KeyMaterial,
    token_signer: TokenSigner,
}

impl CdpClient {
    /// Create a new client with default configuration
    pub fn new(key_material: KeyMaterial) -> Result<Self> {
        Self::with_config(key_material, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(key_material: KeyMaterial, config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(key_material, config, DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default base URL (sandboxes, tests)
    pub fn with_config_and_base_url(
        key_material: KeyMaterial,
        config: ClientConfig,
        base_url: &str,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            // a token is bound to one path; a 3xx comes back as UpstreamApi
            .redirect(Policy::none())
            .build()
            .map_err(|e| CdpError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            key_material,
            token_signer: TokenSigner::new(),
        })
    }

    pub fn key_id(&self) -> &str {
        self.key_material.key_id()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an endpoint
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    /// Send one authenticated request and decode the JSON response.
    ///
    /// A fresh token bound to this method/host/path is minted on every call.
    /// Non-2xx responses become `CdpError::UpstreamApi`; nothing is retried.
    pub async fn send(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        self.send_json(method, endpoint, body).await
    }

    /// Typed variant of [`send`](Self::send)
    pub async fn send_json<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint)?;
        let binding = RequestBinding::from_url(method.as_str(), &url)?;
        let token = self.token_signer.sign(&self.key_material, &binding)?;

        let span = debug_span!("cdp_request", method = %method, path = url.path());
        async move {
            let mut builder = self
                .http_client
                .request(method, url)
                .bearer_auth(token)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json");
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                warn!(error = %e, "CDP request failed before a response");
                CdpError::Network(e)
            })?;
            let status = response.status();
            let bytes = response.bytes().await?;
            debug!(status = status.as_u16(), bytes = bytes.len(), "CDP response received");

            if !status.is_success() {
                let body = serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
                warn!(status = status.as_u16(), "CDP returned an error response");
                return Err(CdpError::upstream(status, body));
            }

            if bytes.is_empty() {
                return Ok(serde_json::from_value(Value::Null)?);
            }
            Ok(serde_json::from_slice(&bytes)?)
        }
        .instrument(span)
        .await
    }
}
