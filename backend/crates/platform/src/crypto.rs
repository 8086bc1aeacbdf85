//! Cryptographic Utilities
//!
//! Digests, HMAC, and the parameter signature scheme shared with external
//! partners (payment gateway callbacks and game-platform requests).

use std::collections::BTreeMap;
use std::fmt;

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use md5::Md5;
use rand::{Rng, RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Name of the signature field in partner payloads
pub const SIGN_FIELD: &str = "sign";

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a string of `len` random decimal digits (may start with `0`)
pub fn random_digits(len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 as lower-case hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// MD5 as lower-case hex
///
/// Only used where a partner protocol mandates it. Never for local secrets.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Encode bytes as URL-safe base64 without padding
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64_url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Decode standard base64 (used for secrets supplied through the environment)
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Partner parameter signatures
// ============================================================================

/// Keyed parameter signer
///
/// Canonical form: every non-empty field except `sign`, sorted byte-wise by
/// key, joined as `key=value` with `&`, followed by `&<secret_field>=<secret>`.
/// The digest is MD5, hex-encoded in upper case.
///
/// ## Examples
/// ```rust
/// use std::collections::BTreeMap;
/// use platform::crypto::ParamSigner;
///
/// let signer = ParamSigner::new("key", "merchant-secret");
/// let mut params = BTreeMap::new();
/// params.insert("mchOrderNo".to_string(), "R100".to_string());
/// params.insert("amount".to_string(), "500".to_string());
///
/// let sign = signer.sign(&params);
/// assert!(signer.verify(&params, &sign));
/// ```
#[derive(Clone)]
pub struct ParamSigner {
    secret_field: String,
    secret: String,
}

impl ParamSigner {
    pub fn new(secret_field: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            secret_field: secret_field.into(),
            secret: secret.into(),
        }
    }

    /// Build the string that gets digested. Contains the secret: never log it.
    fn canonical_string(&self, params: &BTreeMap<String, String>) -> String {
        let mut out = String::new();
        for (key, value) in params {
            if key == SIGN_FIELD || value.is_empty() {
                continue;
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('&');
        }
        out.push_str(&self.secret_field);
        out.push('=');
        out.push_str(&self.secret);
        out
    }

    /// Produce the upper-case hex signature for `params`
    pub fn sign(&self, params: &BTreeMap<String, String>) -> String {
        hex::encode_upper(Md5::digest(self.canonical_string(params).as_bytes()))
    }

    /// Recompute and compare against `provided` (case-sensitive)
    pub fn verify(&self, params: &BTreeMap<String, String>, provided: &str) -> bool {
        let expected = self.sign(params);
        constant_time_eq(expected.as_bytes(), provided.as_bytes())
    }
}

impl fmt::Debug for ParamSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSigner")
            .field("secret_field", &self.secret_field)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sha256_known_values() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_md5_known_values() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_random_digits() {
        let digits = random_digits(7);
        assert_eq!(digits.len(), 7);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_hmac_consistency() {
        let key = [42u8; 32];
        assert_eq!(hmac_sha256(&key, b"msg"), hmac_sha256(&key, b"msg"));
        assert_ne!(hmac_sha256(&key, b"msg"), hmac_sha256(&[1u8; 32], b"msg"));
    }

    #[test]
    fn test_base64_url_roundtrip() {
        let encoded = to_base64_url(b"\xff\xfe session");
        assert!(!encoded.contains('='));
        assert_eq!(from_base64_url(&encoded).unwrap(), b"\xff\xfe session");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"ABCD", b"ABCD"));
        assert!(!constant_time_eq(b"ABCD", b"ABCE"));
        assert!(!constant_time_eq(b"ABCD", b"ABC"));
    }

    #[test]
    fn test_canonical_string_order_and_suffix() {
        let signer = ParamSigner::new("key", "s3cret");
        let p = params(&[("mchOrderNo", "R1"), ("amount", "100"), ("appId", "7")]);
        assert_eq!(
            signer.canonical_string(&p),
            "amount=100&appId=7&mchOrderNo=R1&key=s3cret"
        );
    }

    #[test]
    fn test_canonical_string_skips_sign_and_empty() {
        let signer = ParamSigner::new("apikey", "x");
        let p = params(&[("b", "2"), ("a", ""), ("sign", "ZZZ")]);
        assert_eq!(signer.canonical_string(&p), "b=2&apikey=x");
    }

    #[test]
    fn test_canonical_sort_is_bytewise() {
        // Upper-case letters sort before lower-case ones
        let signer = ParamSigner::new("key", "k");
        let p = params(&[("b", "1"), ("B", "2"), ("a", "3")]);
        assert_eq!(signer.canonical_string(&p), "B=2&a=3&b=1&key=k");
    }

    #[test]
    fn test_sign_matches_manual_digest() {
        let signer = ParamSigner::new("key", "s3cret");
        let p = params(&[("amount", "100"), ("mchOrderNo", "R1")]);
        let manual = md5_hex(b"amount=100&mchOrderNo=R1&key=s3cret").to_uppercase();
        assert_eq!(signer.sign(&p), manual);
        assert_eq!(signer.sign(&p).len(), 32);
    }

    #[test]
    fn test_verify_roundtrip_and_single_char_flip() {
        let signer = ParamSigner::new("key", "merchant");
        let p = params(&[
            ("mchOrderNo", "R20241201"),
            ("amount", "50000"),
            ("status", "2"),
            ("paySuccTime", "1733040000000"),
        ]);
        let sign = signer.sign(&p);
        assert!(signer.verify(&p, &sign));

        for key in p.keys() {
            let mut tampered = p.clone();
            let value = tampered.get_mut(key).unwrap();
            let last = value.pop().unwrap();
            value.push(if last == '0' { '1' } else { '0' });
            assert!(!signer.verify(&tampered, &sign), "flip in {key} must fail");
        }
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let signer = ParamSigner::new("key", "merchant");
        let p = params(&[("amount", "1")]);
        let sign = signer.sign(&p);
        assert!(!signer.verify(&p, &sign.to_lowercase()));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let p = params(&[("amount", "1")]);
        let sign = ParamSigner::new("key", "a").sign(&p);
        assert!(!ParamSigner::new("key", "b").verify(&p, &sign));
        assert!(!ParamSigner::new("apikey", "a").verify(&p, &sign));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", ParamSigner::new("key", "topsecret"));
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
