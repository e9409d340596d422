use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the Tally signature for a raw request body:
/// `base64(HMAC-SHA256(body, secret))`.
pub fn sign(raw_body: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(raw_body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature against the raw body. An empty secret or a
/// missing header can never pass, so an unconfigured deployment fails closed.
/// The comparison is constant-time.
pub fn verify(raw_body: &[u8], secret: &str, provided: Option<&str>) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(provided) = provided else {
        return false;
    };

    let expected = sign(raw_body, secret);
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
