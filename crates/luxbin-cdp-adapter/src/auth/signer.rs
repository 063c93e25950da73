/*
[INPUT]:  Validated KeyMaterial and message bytes
[OUTPUT]: DER-encoded ECDSA P-256 signatures and verifying keys
[POS]:    Auth layer - cryptographic signing for request authentication
[UPDATE]: When changing signing algorithm or key format
*/

use p256::SecretKey;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use rand::rngs::OsRng;

use crate::auth::der::RAW_SIGNATURE_LEN;
use crate::auth::key::{KeyMaterial, PrivateKeyDer};
use crate::http::{CdpError, Result};

/// ECDSA P-256 / SHA-256 signer
#[derive(Debug, Clone)]
pub struct P256Signer {
    signing_key: SigningKey,
}

impl P256Signer {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Convert loaded key material into a P-256 signing key.
    ///
    /// Keys for other curves or algorithms fail with `CdpError::Signing`.
    pub fn from_key_material(key: &KeyMaterial) -> Result<Self> {
        let secret = match key.private_key() {
            PrivateKeyDer::Sec1(der) => SecretKey::from_sec1_der(der).map_err(|e| {
                CdpError::Signing(format!("key {} is not a P-256 EC key: {e}", key.key_id()))
            })?,
            PrivateKeyDer::Pkcs8(der) => SecretKey::from_pkcs8_der(der).map_err(|e| {
                CdpError::Signing(format!("key {} is not a P-256 EC key: {e}", key.key_id()))
            })?,
        };
        Ok(Self {
            signing_key: SigningKey::from(secret),
        })
    }

    /// Sign a message, returning the DER encoding
    pub fn sign_der(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_der().as_bytes().to_vec()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key().clone()
    }

    /// Verify a raw `R || S` signature against a message
    pub fn verify(&self, message: &[u8], raw: &[u8; RAW_SIGNATURE_LEN]) -> bool {
        verify_raw(&self.verifying_key(), message, raw)
    }
}

/// Verify a raw `R || S` signature with a public key
pub fn verify_raw(key: &VerifyingKey, message: &[u8], raw: &[u8]) -> bool {
    Signature::from_slice(raw)
        .map(|signature| key.verify(message, &signature).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::der::raw_signature_from_der;

    #[test]
    fn test_sign_and_verify() {
        let signer = P256Signer::generate();
        let message = b"test message";
        let raw = raw_signature_from_der(&signer.sign_der(message)).unwrap();
        assert!(signer.verify(message, &raw));
        assert!(!signer.verify(b"other message", &raw));
    }

    #[test]
    fn test_der_output_is_variable_width() {
        let signer = P256Signer::generate();
        let der = signer.sign_der(b"payload");
        assert_eq!(der[0], 0x30);
        assert!(der.len() <= 72);
    }

    #[test]
    fn test_verify_rejects_wrong_length() {
        let signer = P256Signer::generate();
        assert!(!verify_raw(&signer.verifying_key(), b"m", &[0u8; 63]));
    }
}
