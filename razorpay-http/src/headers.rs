//! Webhook signature lookup on [`http::HeaderMap`]s.
//!
//! Web frameworks hand webhook requests over as `http` types; these
//! helpers bridge them to [`razorpay::webhook`].

use http::HeaderMap;

use crate::constants::SIGNATURE_HEADER;
use crate::error::HttpError;

/// Returns the webhook signature carried by `headers`.
///
/// Header names in an [`HeaderMap`] are already case-insensitive.
///
/// # Errors
///
/// Returns [`HttpError::MissingSignature`] if the header is absent and
/// [`HttpError::InvalidHeaderValue`] if it is not visible ASCII.
pub fn signature_from_headers(headers: &HeaderMap) -> Result<&str, HttpError> {
    let value = headers
        .get(SIGNATURE_HEADER)
        .ok_or(HttpError::MissingSignature(SIGNATURE_HEADER))?;
    Ok(value.to_str()?)
}

/// Verifies a webhook request from its headers and raw body.
///
/// # Errors
///
/// Fails as [`signature_from_headers`] does. A present but wrong
/// signature is `Ok(false)`.
pub fn verify_webhook(headers: &HeaderMap, body: &[u8], secret: &str) -> Result<bool, HttpError> {
    let signature = signature_from_headers(headers)?;
    Ok(razorpay::webhook::verify(body, signature, secret))
}
