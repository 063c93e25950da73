/*
[INPUT]:  Optional YAML configuration file and LUXBIN_GATEWAY__* environment variables
[OUTPUT]: Parsed gateway configuration
[POS]:    Configuration layer - server and upstream settings
[UPDATE]: When adding new configuration options
*/

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use luxbin_cdp_adapter::ClientConfig;
use luxbin_cdp_adapter::http::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

/// Environment prefix, e.g. `LUXBIN_GATEWAY__LISTEN_ADDR`
pub const ENV_PREFIX: &str = "LUXBIN_GATEWAY";

/// Top-level configuration for the gateway
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Socket address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// CDP REST API base URL
    #[serde(default = "default_cdp_base_url")]
    pub cdp_base_url: String,
    /// Timeout for each outbound CDP call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cdp_base_url: default_cdp_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    /// Load from an optional file, then overlay environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("read gateway configuration")?
            .try_deserialize()
            .context("parse gateway configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if !self.cdp_base_url.starts_with("http://") && !self.cdp_base_url.starts_with("https://") {
            bail!("cdp_base_url must be an http(s) URL, got {:?}", self.cdp_base_url);
        }
        // keep outbound calls inside the 120s token window
        if self.request_timeout_secs == 0 || self.request_timeout_secs >= 120 {
            bail!(
                "request_timeout_secs must be between 1 and 119, got {}",
                self.request_timeout_secs
            );
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("invalid listen_addr {:?}", self.listen_addr))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientConfig::default()
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_cdp_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}
