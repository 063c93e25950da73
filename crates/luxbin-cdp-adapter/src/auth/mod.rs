/*
[INPUT]:  CDP API key configuration and outbound request targets
[OUTPUT]: Key material, ES256 signatures, and per-request bearer tokens
[POS]:    Auth layer - handles CDP API authentication
[UPDATE]: When auth flow or signature methods change
*/

pub mod der;
pub mod jwt;
pub mod key;
pub mod signer;

pub use der::raw_signature_from_der;
pub use jwt::{RequestBinding, SignedToken, TokenClaims, TokenHeader, TokenSigner};
pub use key::{
    EnvSecretProvider, KeyEncoding, KeyMaterial, KeyMaterialLoader, PrivateKeyDer,
    SecretProvider, StaticSecretProvider,
};
pub use signer::P256Signer;
