//! HMAC-SHA256 Webhook Signatures
//!
//! Inbound webhooks carry the lowercase hex HMAC-SHA256 of the raw request body,
//! keyed by the shared webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Sign a payload with HMAC-SHA256 and return the hex-encoded signature.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an inbound signature header against the raw body.
///
/// Fails closed: a missing or empty header, or a missing or empty secret, never
/// verifies. The comparison does not short-circuit on the first differing byte.
pub fn verify_signature(body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let (Some(signature), Some(secret)) = (
        signature.filter(|s| !s.is_empty()),
        secret.filter(|s| !s.is_empty()),
    ) else {
        return false;
    };

    let expected = sign_payload(secret, body);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
