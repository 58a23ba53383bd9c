//! Cryptographic Utilities
//!
//! Random secrets and HMAC-signed tokens. A signed token has the shape
//! `value.signature`, where the signature is URL-safe base64 (no padding) of
//! `HMAC-SHA256(secret, value)`.

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fresh 32-byte signing secret
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Decode standard base64 (used for secrets supplied through the environment)
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

fn keyed_mac(key: &[u8; 32], data: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac
}

/// Sign `value`, producing `value.signature`
pub fn sign_token(key: &[u8; 32], value: &str) -> String {
    let signature = keyed_mac(key, value.as_bytes()).finalize().into_bytes();
    format!(
        "{}.{}",
        value,
        general_purpose::URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Verify a token produced by [`sign_token`] and return the signed value
///
/// Returns `None` for malformed tokens and signature mismatches alike.
pub fn verify_token<'a>(key: &[u8; 32], token: &'a str) -> Option<&'a str> {
    let (value, signature_b64) = token.rsplit_once('.')?;
    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .ok()?;

    keyed_mac(key, value.as_bytes())
        .verify_slice(&signature)
        .ok()
        .map(|()| value)
}

/// Compare two secrets without leaking where they differ
///
/// Both sides are MACed under `key` and the tags compared in constant time,
/// so neither the content nor the length of `expected` leaks through timing.
pub fn secrets_match(key: &[u8; 32], expected: &[u8], provided: &[u8]) -> bool {
    let tag = keyed_mac(key, provided).finalize().into_bytes();
    keyed_mac(key, expected).verify_slice(&tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret_not_zero() {
        let secret = random_secret();
        assert!(secret.iter().any(|&b| b != 0));
        assert_ne!(random_secret(), secret);
    }

    #[test]
    fn test_signature_is_rfc4231_hmac() {
        // RFC 4231 test case 2, with the key zero-padded to 32 bytes
        let mut key = [0u8; 32];
        key[..4].copy_from_slice(b"Jefe");
        let token = sign_token(&key, "what do ya want for nothing?");
        let (_, signature) = token.rsplit_once('.').unwrap();
        assert_eq!(
            hex::encode(general_purpose::URL_SAFE_NO_PAD.decode(signature).unwrap()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_signed_token_verifies() {
        let key = [7u8; 32];
        let token = sign_token(&key, "3f2a-session");
        assert!(token.starts_with("3f2a-session."));
        assert_eq!(verify_token(&key, &token), Some("3f2a-session"));
    }

    #[test]
    fn test_signed_token_rejects_tampering() {
        let key = [7u8; 32];
        let token = sign_token(&key, "session-a");
        let forged = token.replacen("session-a", "session-b", 1);
        assert_eq!(verify_token(&key, &forged), None);
        assert_eq!(verify_token(&[8u8; 32], &token), None);
        assert_eq!(verify_token(&key, "no-signature"), None);
        assert_eq!(verify_token(&key, "value.!!!"), None);
        assert_eq!(verify_token(&key, "value."), None);
    }

    #[test]
    fn test_secrets_match() {
        let key = [3u8; 32];
        assert!(secrets_match(&key, b"csrf-state", b"csrf-state"));
        assert!(!secrets_match(&key, b"csrf-state", b"csrf-statf"));
        assert!(!secrets_match(&key, b"csrf-state", b"csrf"));
        assert!(!secrets_match(&key, b"csrf-state", b""));
    }
}
