//! Webhook signature verification

use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha1::Sha1;
use sha2::Sha256;

use crate::errors::NavisError;

pub const SIGNATURE_SHA256_HEADER: &str = "x-hub-signature-256";
pub const SIGNATURE_SHA1_HEADER: &str = "x-hub-signature";

/// Verify the HMAC signature of a webhook body.
///
/// `X-Hub-Signature-256: sha256=<hex>` is preferred; `X-Hub-Signature:
/// sha1=<hex>` is accepted when the former is absent. Fails closed.
pub fn verify_signature(headers: &HeaderMap, body: &[u8], secret: &str) -> bool {
    if let Some(sig) = header_str(headers, SIGNATURE_SHA256_HEADER) {
        return match sig.strip_prefix("sha256=").and_then(|h| hex::decode(h).ok()) {
            Some(expected) => verify::<Hmac<Sha256>>(secret, body, &expected),
            None => false,
        };
    }

    if let Some(sig) = header_str(headers, SIGNATURE_SHA1_HEADER) {
        return match sig.strip_prefix("sha1=").and_then(|h| hex::decode(h).ok()) {
            Some(expected) => verify::<Hmac<Sha1>>(secret, body, &expected),
            None => false,
        };
    }

    false
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// `verify_slice` compares in constant time.
fn verify<M: Mac + hmac::digest::KeyInit>(secret: &str, body: &[u8], expected: &[u8]) -> bool {
    let mut mac = match <M as Mac>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(expected).is_ok()
}

/// Compute the `sha1=<hex>` signature of a body
pub fn sign_sha1(secret: &str, body: &[u8]) -> Result<String, NavisError> {
    let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| NavisError::ValidationError(e.to_string()))?;
    mac.update(body);
    Ok(format!("sha1={}", hex::encode(mac.finalize().into_bytes())))
}

/// Compute the `sha256=<hex>` signature of a body
pub fn sign_sha256(secret: &str, body: &[u8]) -> Result<String, NavisError> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| NavisError::ValidationError(e.to_string()))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}
