//! HTTP transport for the Razorpay client.
//!
//! Provides the `reqwest`-backed [`HttpAdapter`](razorpay::HttpAdapter)
//! and webhook helpers over [`http::HeaderMap`].
//!
//! # Modules
//!
//! - [`adapter`] - `reqwest` transport (feature: `client`)
//! - [`constants`] - Header names and client defaults
//! - [`error`] - HTTP layer error types
//! - [`headers`] - Webhook signature lookup on header maps

pub mod constants;
pub mod error;
pub mod headers;

#[cfg(feature = "client")]
pub mod adapter;

#[cfg(feature = "client")]
pub use adapter::ReqwestAdapter;

/// Creates a [`razorpay::Client`] over a default [`ReqwestAdapter`].
///
/// # Errors
///
/// Returns [`error::HttpError::Build`] if the HTTP client cannot be built.
#[cfg(feature = "client")]
pub fn client(config: razorpay::Config) -> Result<razorpay::Client, error::HttpError> {
    let adapter = ReqwestAdapter::try_new()?;
    Ok(razorpay::Client::new(config, std::sync::Arc::new(adapter)))
}
