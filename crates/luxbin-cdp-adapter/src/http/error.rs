/*
[INPUT]:  Error sources (configuration, signing, HTTP, upstream API, serialization)
[OUTPUT]: Structured error types with status mapping and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or changing the HTTP status mapping
*/

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Main error type for the CDP adapter
#[derive(Error, Debug)]
pub enum CdpError {
    /// Key material is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Key material is present but cannot produce an ES256 signature
    #[error("Signing error: {0}")]
    Signing(String),

    /// CDP returned a non-2xx response
    #[error("CDP API error (status {status}): {body}")]
    UpstreamApi { status: u16, body: Value },

    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A serialized token failed to parse or verify
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Caller supplied an incomplete or invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// CDP answered 2xx with something that cannot be used as a complete result
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl CdpError {
    /// Build an upstream error from a status code and decoded body
    pub fn upstream(status: StatusCode, body: Value) -> Self {
        CdpError::UpstreamApi {
            status: status.as_u16(),
            body,
        }
    }

    /// Check if a caller may retry the request.
    ///
    /// A retry must go back through the client so a fresh token is minted;
    /// a serialized token is never resent.
    pub fn is_retryable(&self) -> bool {
        match self {
            CdpError::Network(_) => true,
            CdpError::UpstreamApi { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, CdpError::InvalidRequest(_))
    }

    /// HTTP status a proxy handler should answer with
    pub fn http_status(&self) -> StatusCode {
        match self {
            CdpError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CdpError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            CdpError::UpstreamApi { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            CdpError::Network(_) | CdpError::InvalidResponse(_) | CdpError::Serialization(_) => {
                StatusCode::BAD_GATEWAY
            }
            CdpError::Configuration(_) | CdpError::Signing(_) | CdpError::UrlParse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to a browser.
    ///
    /// Upstream errors surface the platform's own message when it sent one.
    pub fn public_message(&self) -> String {
        match self {
            CdpError::UpstreamApi { status, body } => upstream_message(body)
                .unwrap_or_else(|| format!("CDP request failed with status {status}")),
            CdpError::InvalidRequest(message) => message.clone(),
            CdpError::InvalidToken(_) => "Token is invalid".to_string(),
            CdpError::Configuration(_) => "Server is missing CDP credentials".to_string(),
            CdpError::Signing(_) => "Server could not sign the CDP request".to_string(),
            CdpError::Network(_) => "CDP is unreachable".to_string(),
            CdpError::InvalidResponse(_) | CdpError::Serialization(_) => {
                "CDP returned an unreadable response".to_string()
            }
            CdpError::UrlParse(_) => "Server has an invalid CDP endpoint".to_string(),
        }
    }
}

fn upstream_message(body: &Value) -> Option<String> {
    if let Some(text) = body.as_str() {
        return (!text.trim().is_empty()).then(|| text.to_string());
    }
    ["message", "errorMessage", "error_message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Result type alias for CDP operations
pub type Result<T> = std::result::Result<T, CdpError>;
