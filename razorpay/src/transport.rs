//! Transport seam between the dispatch pipeline and the network.
//!
//! [`HttpAdapter`] is the only place where I/O happens. The pipeline hands
//! it a fully built request and receives either a [`RawResponse`] or a
//! [`TransportError`]. Swap the adapter to test without a network.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP methods used by the gateway API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method name in upper case.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request transport options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Timeout the adapter must enforce.
    pub timeout: Duration,
    /// Query parameters, passed through unencoded.
    pub query: Vec<(String, String)>,
}

/// Raw gateway response as produced by an [`HttpAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
    /// Response headers in wire order.
    pub headers: Vec<(String, String)>,
}

impl RawResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Returns the first header value matching `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Looks up a header value by case-insensitive name.
#[must_use]
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Performs a single HTTP exchange.
///
/// Implementations must enforce [`RequestOptions::timeout`] and report a
/// timeout as a [`TransportError`]. Query parameters are appended (and
/// URL-encoded) by the adapter.
#[async_trait]
pub trait HttpAdapter: Send + Sync {
    /// Sends the request and returns the raw response.
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: &str,
        headers: &[(String, String)],
        options: &RequestOptions,
    ) -> Result<RawResponse, TransportError>;
}
