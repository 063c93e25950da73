/*
[INPUT]:  CDP API key id and key secret from an injected secret provider
[OUTPUT]: Validated KeyMaterial ready for ES256 signing
[POS]:    Auth layer - key material loading and format validation
[UPDATE]: When supported key encodings or secret names change
*/

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pkcs8::PrivateKeyInfo;
use pkcs8::der::Decode;
use sec1::EcPrivateKey;
use tracing::debug;
use zeroize::Zeroizing;

use crate::http::{CdpError, Result};

/// Environment variable holding the API key id
pub const KEY_ID_ENV: &str = "CDP_API_KEY_ID";
/// Older name for the API key id, still used by CDP's key download
pub const KEY_ID_LEGACY_ENV: &str = "CDP_API_KEY_NAME";
/// Environment variable holding the API key secret
pub const KEY_SECRET_ENV: &str = "CDP_API_KEY_SECRET";

/// Source of named secrets (environment, secret store, test fixtures)
pub trait SecretProvider: Send + Sync {
    /// Look up a secret by name
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretProvider;

impl SecretProvider for EnvSecretProvider {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed in-memory secrets
#[derive(Clone, Default)]
pub struct StaticSecretProvider {
    values: HashMap<String, String>,
}

impl StaticSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret, returning the provider for chaining
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }
}

impl SecretProvider for StaticSecretProvider {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl fmt::Debug for StaticSecretProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecretProvider")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// How the key secret was encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    Sec1Der,
    Pkcs8Der,
    Sec1Pem,
    Pkcs8Pem,
}

/// Structurally valid private key document
#[derive(Clone)]
pub enum PrivateKeyDer {
    /// RFC 5915 `ECPrivateKey`
    Sec1(Zeroizing<Vec<u8>>),
    /// RFC 5208 `PrivateKeyInfo`; the algorithm is checked at signing time
    Pkcs8(Zeroizing<Vec<u8>>),
}

impl PrivateKeyDer {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PrivateKeyDer::Sec1(der) | PrivateKeyDer::Pkcs8(der) => der.as_slice(),
        }
    }
}

/// API key identity plus its private key
#[derive(Clone)]
pub struct KeyMaterial {
    key_id: String,
    private_key: PrivateKeyDer,
    encoding: KeyEncoding,
}

impl KeyMaterial {
    /// Build key material from a key id and an encoded secret
    pub fn from_secret(key_id: &str, secret: &str) -> Result<Self> {
        let key_id = key_id.trim();
        if key_id.is_empty() {
            return Err(CdpError::Configuration("API key id is empty".to_string()));
        }
        let (private_key, encoding) = decode_private_key(secret)?;
        Ok(Self {
            key_id: key_id.to_string(),
            private_key,
            encoding,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn private_key(&self) -> &PrivateKeyDer {
        &self.private_key
    }

    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_id", &self.key_id)
            .field("encoding", &self.encoding)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Loads KeyMaterial through a SecretProvider
#[derive(Debug, Clone)]
pub struct KeyMaterialLoader<P = EnvSecretProvider> {
    provider: P,
}

impl KeyMaterialLoader<EnvSecretProvider> {
    /// Loader reading `CDP_API_KEY_ID` / `CDP_API_KEY_SECRET`
    pub fn from_env() -> Self {
        Self::new(EnvSecretProvider)
    }
}

impl<P: SecretProvider> KeyMaterialLoader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Read and validate the key. No network access.
    pub fn load(&self) -> Result<KeyMaterial> {
        let key_id = self
            .non_empty(KEY_ID_ENV)
            .or_else(|| self.non_empty(KEY_ID_LEGACY_ENV))
            .ok_or_else(|| CdpError::Configuration(format!("{KEY_ID_ENV} is not set")))?;
        let secret = self
            .non_empty(KEY_SECRET_ENV)
            .map(Zeroizing::new)
            .ok_or_else(|| CdpError::Configuration(format!("{KEY_SECRET_ENV} is not set")))?;

        let material = KeyMaterial::from_secret(&key_id, &secret)?;
        debug!(
            key_id = material.key_id(),
            encoding = ?material.encoding(),
            "loaded CDP key material"
        );
        Ok(material)
    }

    fn non_empty(&self, name: &str) -> Option<String> {
        self.provider
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Decode a secret as SEC1 DER, PKCS#8 DER, then PEM, in that order.
pub fn decode_private_key(secret: &str) -> Result<(PrivateKeyDer, KeyEncoding)> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(CdpError::Configuration("API key secret is empty".to_string()));
    }

    if let Ok(bytes) = STANDARD.decode(secret) {
        let bytes = Zeroizing::new(bytes);
        if EcPrivateKey::from_der(&bytes).is_ok() {
            return Ok((PrivateKeyDer::Sec1(bytes), KeyEncoding::Sec1Der));
        }
        if PrivateKeyInfo::from_der(&bytes).is_ok() {
            return Ok((PrivateKeyDer::Pkcs8(bytes), KeyEncoding::Pkcs8Der));
        }
        return Err(CdpError::Configuration(
            "API key secret is base64 but not an EC private key (SEC1 or PKCS#8 DER)".to_string(),
        ));
    }

    // .env files often carry PEM with literal "\n" sequences
    let pem = Zeroizing::new(secret.replace("\\n", "\n"));
    if pem.starts_with("-----BEGIN") {
        return decode_pem(&pem);
    }

    Err(CdpError::Configuration(
        "API key secret is neither base64 DER nor PEM".to_string(),
    ))
}

fn decode_pem(pem: &str) -> Result<(PrivateKeyDer, KeyEncoding)> {
    let (label, der) = pem_rfc7468::decode_vec(pem.as_bytes())
        .map_err(|e| CdpError::Configuration(format!("API key secret is not valid PEM: {e}")))?;
    let der = Zeroizing::new(der);

    match label {
        "EC PRIVATE KEY" => {
            EcPrivateKey::from_der(&der).map_err(|e| {
                CdpError::Configuration(format!("invalid SEC1 private key: {e}"))
            })?;
            Ok((PrivateKeyDer::Sec1(der), KeyEncoding::Sec1Pem))
        }
        "PRIVATE KEY" => {
            PrivateKeyInfo::from_der(&der).map_err(|e| {
                CdpError::Configuration(format!("invalid PKCS#8 private key: {e}"))
            })?;
            Ok((PrivateKeyDer::Pkcs8(der), KeyEncoding::Pkcs8Pem))
        }
        other => Err(CdpError::Configuration(format!(
            "unsupported PEM label {other:?}, expected EC PRIVATE KEY or PRIVATE KEY"
        ))),
    }
}
