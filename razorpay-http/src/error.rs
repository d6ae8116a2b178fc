//! Error types for the HTTP transport layer.

/// Errors raised by the HTTP layer itself, outside a gateway call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HttpError {
    /// The underlying HTTP client could not be constructed.
    #[cfg(feature = "client")]
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The webhook signature header is absent.
    #[error("missing `{0}` header")]
    MissingSignature(&'static str),

    /// A header value is not visible ASCII.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::ToStrError),
}
