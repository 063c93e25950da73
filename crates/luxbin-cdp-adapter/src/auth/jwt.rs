/*
[INPUT]:  KeyMaterial and the method/host/path of one outbound request
[OUTPUT]: Short-lived ES256 bearer tokens for the CDP REST API
[POS]:    Auth layer - token minting and verification
[UPDATE]: When CDP changes its JWT claims or freshness window
*/

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use p256::ecdsa::VerifyingKey;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::der::{RAW_SIGNATURE_LEN, raw_signature_from_der};
use crate::auth::key::KeyMaterial;
use crate::auth::signer::{P256Signer, verify_raw};
use crate::http::{CdpError, Result};

/// JWS algorithm name for ECDSA P-256 / SHA-256
pub const ALGORITHM: &str = "ES256";
/// Issuer claim expected by CDP
pub const ISSUER: &str = "cdp";
/// Audience claim expected by CDP
pub const AUDIENCE: &str = "cdp_service";
/// Seconds between `nbf` and `exp`
pub const TOKEN_LIFETIME_SECS: i64 = 120;

const NONCE_BYTES: usize = 16;

/// JOSE header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub kid: String,
    pub nonce: String,
    pub typ: String,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
    pub aud: Vec<String>,
    /// `"METHOD host/path"` of the single request the token authorizes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// The request a token is minted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBinding {
    method: String,
    host: String,
    path: String,
    bound: bool,
}

impl RequestBinding {
    pub fn new(method: &str, host: &str, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            method: method.to_ascii_uppercase(),
            host: host.to_string(),
            path,
            bound: true,
        }
    }

    /// Binding for a full URL. The query string is not part of the claim.
    pub fn from_url(method: &str, url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| CdpError::Configuration(format!("URL {url} has no host")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self::new(method, &host, url.path()))
    }

    /// Drop the `uri` claim, for endpoints that do not take per-request binding
    pub fn unbound(mut self) -> Self {
        self.bound = false;
        self
    }

    pub fn uri(&self) -> String {
        format!("{} {}{}", self.method, self.host, self.path)
    }

    fn claim(&self) -> Option<String> {
        self.bound.then(|| self.uri())
    }
}

/// A minted token together with its decoded parts
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub header: TokenHeader,
    pub claims: TokenClaims,
    serialized: String,
}

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    pub fn into_string(self) -> String {
        self.serialized
    }

    /// Raw `R || S` signature bytes
    pub fn signature(&self) -> Result<Vec<u8>> {
        let (_, signature) = split_signature(&self.serialized)?;
        decode_segment_bytes(signature)
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedToken")
            .field("header", &self.header)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// Mints ES256 bearer tokens, one per request
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSigner;

impl TokenSigner {
    pub fn new() -> Self {
        Self
    }

    /// Mint and serialize a token valid from now for 120 seconds
    pub fn sign(&self, key: &KeyMaterial, binding: &RequestBinding) -> Result<String> {
        self.mint(key, binding).map(SignedToken::into_string)
    }

    pub fn sign_at(
        &self,
        key: &KeyMaterial,
        binding: &RequestBinding,
        now: DateTime<Utc>,
    ) -> Result<String> {
        self.mint_at(key, binding, now).map(SignedToken::into_string)
    }

    pub fn mint(&self, key: &KeyMaterial, binding: &RequestBinding) -> Result<SignedToken> {
        self.mint_at(key, binding, Utc::now())
    }

    pub fn mint_at(
        &self,
        key: &KeyMaterial,
        binding: &RequestBinding,
        now: DateTime<Utc>,
    ) -> Result<SignedToken> {
        let signer = P256Signer::from_key_material(key)?;

        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            kid: key.key_id().to_string(),
            nonce: generate_nonce(),
            typ: "JWT".to_string(),
        };
        let nbf = now.timestamp();
        let claims = TokenClaims {
            iss: ISSUER.to_string(),
            sub: key.key_id().to_string(),
            nbf,
            exp: nbf + TOKEN_LIFETIME_SECS,
            aud: vec![AUDIENCE.to_string()],
            uri: binding.claim(),
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let der = signer.sign_der(signing_input.as_bytes());
        let raw = raw_signature_from_der(&der)?;
        let serialized = format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(raw));

        Ok(SignedToken {
            header,
            claims,
            serialized,
        })
    }

    /// Check once that the key can sign, so a process fails at startup
    /// rather than on its first request.
    pub fn preflight(&self, key: &KeyMaterial) -> Result<VerifyingKey> {
        P256Signer::from_key_material(key).map(|signer| signer.verifying_key())
    }

    /// Parse and verify a serialized token. Expiry is not checked.
    pub fn verify(key: &VerifyingKey, token: &str) -> Result<SignedToken> {
        let (signing_input, signature) = split_signature(token)?;
        let raw = decode_segment_bytes(signature)?;
        if raw.len() != RAW_SIGNATURE_LEN {
            return Err(CdpError::InvalidToken(format!(
                "signature is {} bytes, expected {RAW_SIGNATURE_LEN}",
                raw.len()
            )));
        }
        if !verify_raw(key, signing_input.as_bytes(), &raw) {
            return Err(CdpError::InvalidToken(
                "signature does not verify".to_string(),
            ));
        }

        let (header, claims) = signing_input
            .split_once('.')
            .ok_or_else(|| CdpError::InvalidToken("missing claims segment".to_string()))?;
        Ok(SignedToken {
            header: decode_segment(header)?,
            claims: decode_segment(claims)?,
            serialized: token.to_string(),
        })
    }
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T> {
    let bytes = decode_segment_bytes(segment)?;
    serde_json::from_slice(&bytes).map_err(|e| CdpError::InvalidToken(e.to_string()))
}

fn decode_segment_bytes(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CdpError::InvalidToken(format!("segment is not base64url: {e}")))
}

fn split_signature(token: &str) -> Result<(&str, &str)> {
    if token.split('.').count() != 3 {
        return Err(CdpError::InvalidToken(
            "expected three dot-separated segments".to_string(),
        ));
    }
    token
        .rsplit_once('.')
        .ok_or_else(|| CdpError::InvalidToken("missing signature segment".to_string()))
}
