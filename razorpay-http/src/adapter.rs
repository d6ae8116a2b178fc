//! `reqwest`-backed [`HttpAdapter`].
//!
//! [`ReqwestAdapter`] performs exactly one HTTP exchange per call. It does
//! not interpret statuses: any response, 2xx or not, is handed back as a
//! [`RawResponse`] and only failures without a status become a
//! [`TransportError`].

use async_trait::async_trait;
use razorpay::error::TransportError;
use razorpay::transport::{HttpAdapter, Method, RawResponse, RequestOptions};
use url::Url;

use crate::constants::DEFAULT_REDIRECT_LIMIT;
use crate::error::HttpError;

/// HTTP transport built on a shared [`reqwest::Client`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use razorpay::{Client, Config};
/// use razorpay_http::adapter::ReqwestAdapter;
///
/// # fn main() -> Result<(), razorpay_http::error::HttpError> {
/// let adapter = ReqwestAdapter::try_new()?;
/// let client = Client::new(Config::basic("rzp_test_abc", "secret"), Arc::new(adapter));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestAdapter {
    client: reqwest::Client,
}

impl ReqwestAdapter {
    /// Creates an adapter with a freshly built client.
    ///
    /// Timeouts are applied per request from [`RequestOptions`], so the
    /// client itself carries none.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Build`] if the TLS backend cannot be
    /// initialized.
    pub fn try_new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_REDIRECT_LIMIT))
            .build()
            .map_err(HttpError::Build)?;
        Ok(Self { client })
    }

    /// Wraps a pre-configured client (proxies, custom TLS roots, ...).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpAdapter for ReqwestAdapter {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: &str,
        headers: &[(String, String)],
        options: &RequestOptions,
    ) -> Result<RawResponse, TransportError> {
        let url = with_query(url, &options.query)?;
        trace_request(method, &url);

        let mut request = self
            .client
            .request(to_reqwest_method(method), url)
            .timeout(options.timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !body.is_empty() {
            request = request.body(body.to_owned());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(describe(&e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        trace_response(status, body.len());
        Ok(RawResponse {
            status,
            body,
            headers,
        })
    }
}

/// Parses `url` and appends URL-encoded query pairs.
fn with_query(url: &str, query: &[(String, String)]) -> Result<Url, TransportError> {
    let mut url =
        Url::parse(url).map_err(|e| TransportError::new(format!("invalid URL {url:?}: {e}")))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

const fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}

#[cfg(feature = "telemetry")]
fn trace_request(method: Method, url: &Url) {
    tracing::debug!(%method, url = %url, "Sending request to gateway");
}

#[cfg(not(feature = "telemetry"))]
const fn trace_request(_method: Method, _url: &Url) {}

#[cfg(feature = "telemetry")]
fn trace_response(status: u16, body_len: usize) {
    tracing::debug!(status, body_len, "Received response from gateway");
}

#[cfg(not(feature = "telemetry"))]
const fn trace_response(_status: u16, _body_len: usize) {}
