/*
[INPUT]:  HTTP client configuration, key material and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - CDP REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod onramp;
pub mod webhooks;

pub use error::{CdpError, Result};

pub use client::{CdpClient, ClientConfig, DEFAULT_BASE_URL};
