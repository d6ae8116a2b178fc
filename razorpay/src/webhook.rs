//! Webhook and checkout signature verification.
//!
//! The gateway signs webhook bodies and checkout callbacks with
//! HMAC-SHA256. Signatures are lowercase hex; a signature in any other
//! form does not verify.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::transport::find_header;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Returns the lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
#[must_use]
pub fn sign(payload: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a webhook body against its signature.
///
/// ```
/// let signature = razorpay::webhook::sign(b"test_payload", "test_secret");
/// assert!(razorpay::webhook::verify(b"test_payload", &signature, "test_secret"));
/// ```
#[must_use]
pub fn verify(payload: &[u8], signature: &str, secret: &str) -> bool {
    let expected = sign(payload, secret);
    !expected.is_empty() && constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

/// Finds the webhook signature among response-style headers, matching
/// the header name case-insensitively.
#[must_use]
pub fn extract_signature(headers: &[(String, String)]) -> Option<&str> {
    find_header(headers, SIGNATURE_HEADER)
}

/// Checks the signature returned by standard checkout.
#[must_use]
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    verify(format!("{order_id}|{payment_id}").as_bytes(), signature, secret)
}

/// Checks the signature returned by subscription checkout.
#[must_use]
pub fn verify_subscription_signature(
    payment_id: &str,
    subscription_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    verify(
        format!("{payment_id}|{subscription_id}").as_bytes(),
        signature,
        secret,
    )
}

/// Checks the signature appended to a payment link's callback URL.
#[must_use]
pub fn verify_payment_link_signature(
    link_id: &str,
    reference_id: &str,
    status: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    verify(
        format!("{link_id}|{reference_id}|{status}|{payment_id}").as_bytes(),
        signature,
        secret,
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
