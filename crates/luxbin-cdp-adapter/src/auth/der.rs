/*
[INPUT]:  DER-encoded ECDSA signatures (SEQUENCE { INTEGER r, INTEGER s })
[OUTPUT]: Fixed-width 64-byte R || S signatures for JWS ES256
[POS]:    Auth layer - signature encoding conversion
[UPDATE]: When supporting curves with a different scalar width
*/

use p256::ecdsa::Signature;

use crate::http::{CdpError, Result};

/// Width of one P-256 scalar in bytes
pub const SCALAR_LEN: usize = 32;
/// Width of an ES256 signature on the wire
pub const RAW_SIGNATURE_LEN: usize = SCALAR_LEN * 2;

/// Unpack a DER signature into raw `R || S`.
///
/// DER integers are minimal and signed: a 33-byte integer carries a leading
/// 0x00 sign byte, which is stripped; shorter integers are left-padded.
/// Scalars outside `1..n` are rejected.
pub fn raw_signature_from_der(der: &[u8]) -> Result<[u8; RAW_SIGNATURE_LEN]> {
    let signature = Signature::from_der(der)
        .map_err(|e| CdpError::Signing(format!("malformed DER signature: {e}")))?;

    let mut raw = [0u8; RAW_SIGNATURE_LEN];
    raw.copy_from_slice(&signature.to_bytes());
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENCE_TAG: u8 = 0x30;
    const INTEGER_TAG: u8 = 0x02;

    fn der(r: &[u8], s: &[u8]) -> Vec<u8> {
        let mut body = vec![INTEGER_TAG, r.len() as u8];
        body.extend_from_slice(r);
        body.extend_from_slice(&[INTEGER_TAG, s.len() as u8]);
        body.extend_from_slice(s);
        let mut out = vec![SEQUENCE_TAG, body.len() as u8];
        out.extend(body);
        out
    }

    #[test]
    fn test_full_width_scalars() {
        let r = [0x11u8; 32];
        let s = [0x22u8; 32];
        let raw = raw_signature_from_der(&der(&r, &s)).unwrap();
        assert_eq!(&raw[..32], &r);
        assert_eq!(&raw[32..], &s);
    }

    #[test]
    fn test_strips_sign_byte() {
        let mut r = vec![0x00];
        r.extend_from_slice(&[0x80u8; 32]);
        let s = [0x01u8; 32];
        let raw = raw_signature_from_der(&der(&r, &s)).unwrap();
        assert_eq!(&raw[..32], &[0x80u8; 32]);
        assert_eq!(&raw[32..], &s);
    }

    #[test]
    fn test_left_pads_short_scalars() {
        let r = [0x7fu8; 30];
        let s = [0x05u8];
        let raw = raw_signature_from_der(&der(&r, &s)).unwrap();
        assert_eq!(&raw[..2], &[0, 0]);
        assert_eq!(&raw[2..32], &r);
        assert_eq!(&raw[32..63], &[0u8; 31]);
        assert_eq!(raw[63], 0x05);
    }

    #[test]
    fn test_rejects_oversized_integer() {
        let r = [0x01u8; 33];
        let s = [0x01u8; 32];
        assert!(matches!(
            raw_signature_from_der(&der(&r, &s)),
            Err(CdpError::Signing(_))
        ));
    }

    #[test]
    fn test_rejects_zero_scalar() {
        let result = raw_signature_from_der(&der(&[0x00], &[0x02u8; 32]));
        assert!(matches!(result, Err(CdpError::Signing(_))));
    }

    #[test]
    fn test_rejects_truncated_input() {
        let mut encoded = der(&[0x01u8; 32], &[0x02u8; 32]);
        encoded.truncate(encoded.len() - 1);
        assert!(raw_signature_from_der(&encoded).is_err());
    }

    #[test]
    fn test_rejects_wrong_outer_tag() {
        let mut encoded = der(&[0x01u8; 32], &[0x02u8; 32]);
        encoded[0] = 0x31;
        assert!(raw_signature_from_der(&encoded).is_err());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut encoded = der(&[0x01u8; 32], &[0x02u8; 32]);
        encoded.push(0x00);
        assert!(raw_signature_from_der(&encoded).is_err());
    }
}
