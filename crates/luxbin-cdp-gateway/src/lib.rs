/*
[INPUT]:  Public API exports for luxbin-cdp-gateway crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod commands;
pub mod config;
pub mod routes;

// Re-export main types for convenience
pub use config::GatewayConfig;
pub use routes::{AppState, router};
