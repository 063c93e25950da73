/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public CDP adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    EnvSecretProvider,
    KeyMaterial,
    KeyMaterialLoader,
    P256Signer,
    RequestBinding,
    SecretProvider,
    SignedToken,
    StaticSecretProvider,
    TokenSigner,
};

// Re-export commonly used types from http
pub use http::{
    CdpClient,
    CdpError,
    ClientConfig,
    Result,
};

// Re-export all types
pub use types::*;
