//! Request construction.
//!
//! An [`Operation`] describes one logical gateway call. [`build`] turns it,
//! together with a [`ResolvedConfig`] snapshot, into the final URL, the
//! merged header list and the encoded body handed to the transport.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ResolvedConfig;
use crate::error::Error;
use crate::transport::{Method, RequestOptions};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("razorpay-rust/", env!("CARGO_PKG_VERSION"));

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const USER_AGENT_HEADER: &str = "User-Agent";

/// Which base URL an operation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Host {
    /// The REST API host.
    #[default]
    Api,
    /// The OAuth host.
    Auth,
}

/// A single logical gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// HTTP method.
    pub method: Method,
    /// Path appended to the base URL, including the leading `/`.
    pub path: String,
    /// Body fields in insertion order.
    pub body: Map<String, Value>,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Target host.
    pub host: Host,
    /// Extra headers for this call only.
    pub headers: Vec<(String, String)>,
    /// Overrides the configured timeout.
    pub timeout: Option<Duration>,
}

impl Operation {
    /// Creates an operation with an empty body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Map::new(),
            query: Vec::new(),
            host: Host::Api,
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Creates a `GET` operation.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a `POST` operation.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a `PUT` operation.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Creates a `PATCH` operation.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// Creates a `DELETE` operation.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    /// Replaces the body with the JSON object form of `body`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `body` cannot be serialized or does not
    /// serialize to a JSON object.
    pub fn try_with_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, Error> {
        match serde_json::to_value(body).map_err(Error::Encode)? {
            Value::Object(map) => Ok(self.with_body(map)),
            other => Err(Error::Encode(<serde_json::Error as serde::ser::Error>::custom(format!(
                "request body must be a JSON object, got {}",
                json_type(&other)
            )))),
        }
    }

    /// Sets a single body field.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Selects the target host.
    #[must_use]
    pub const fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    /// Adds a per-call header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the configured timeout for this call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A request ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    /// HTTP method.
    pub method: Method,
    /// Base URL joined with the operation path.
    pub url: String,
    /// Merged headers; names are unique ignoring case.
    pub headers: Vec<(String, String)>,
    /// Encoded body, empty for `GET` and for empty bodies.
    pub body: String,
    /// Timeout and query parameters.
    pub options: RequestOptions,
}

/// Builds the transport request for `operation` from a config snapshot.
///
/// Header precedence, later entries replacing earlier ones by
/// case-insensitive name: defaults, config headers, per-call headers, and
/// finally the computed `Authorization`.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the body cannot be encoded.
pub fn build(operation: &Operation, config: &ResolvedConfig) -> Result<BuiltRequest, Error> {
    let base = match operation.host {
        Host::Api => &config.api_base_url,
        Host::Auth => &config.auth_base_url,
    };
    let url = format!("{base}{}", operation.path);

    let mut headers = Vec::with_capacity(4 + config.custom_headers.len() + operation.headers.len());
    set_header(&mut headers, CONTENT_TYPE, "application/json");
    set_header(&mut headers, USER_AGENT_HEADER, USER_AGENT);
    for (name, value) in config.custom_headers.iter().chain(&operation.headers) {
        set_header(&mut headers, name, value);
    }
    set_header(&mut headers, AUTHORIZATION, &config.credentials.authorization());

    Ok(BuiltRequest {
        method: operation.method,
        url,
        headers,
        body: encode_body(operation.method, &operation.body)?,
        options: RequestOptions {
            timeout: operation.timeout.unwrap_or(config.timeout),
            query: operation.query.clone(),
        },
    })
}

/// Encodes a request body. `GET` requests and empty bodies encode to `""`.
///
/// # Errors
///
/// Returns [`Error::Encode`] if serialization fails.
pub fn encode_body(method: Method, body: &Map<String, Value>) -> Result<String, Error> {
    if method == Method::Get || body.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(body).map_err(Error::Encode)
}

/// Inserts a header, replacing any existing entry with the same name
/// ignoring case.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.to_owned(), value.to_owned()));
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::transport::find_header;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn config(credentials: Credentials) -> ResolvedConfig {
        ResolvedConfig {
            credentials,
            custom_headers: vec![("X-Team".to_owned(), "payments".to_owned())],
            api_base_url: "https://api.example/v1".to_owned(),
            auth_base_url: "https://auth.example".to_owned(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_url_uses_host_selector() {
        let cfg = config(Credentials::basic("abc", "xyz"));

        let api = build(&Operation::get("/payments/pay_1"), &cfg).unwrap();
        assert_eq!(api.url, "https://api.example/v1/payments/pay_1");

        let auth = build(&Operation::post("/token").with_host(Host::Auth), &cfg).unwrap();
        assert_eq!(auth.url, "https://auth.example/token");
    }

    #[test]
    fn test_get_body_is_always_empty() {
        let cfg = config(Credentials::basic("abc", "xyz"));
        let op = Operation::get("/orders").with_param("count", 10);
        assert_eq!(build(&op, &cfg).unwrap().body, "");
    }

    #[test]
    fn test_empty_body_encodes_to_empty_string() {
        let cfg = config(Credentials::basic("abc", "xyz"));
        assert_eq!(build(&Operation::post("/orders"), &cfg).unwrap().body, "");
    }

    #[test]
    fn test_post_body_preserves_insertion_order() {
        let cfg = config(Credentials::basic("abc", "xyz"));
        let op = Operation::post("/orders")
            .with_param("currency", "INR")
            .with_param("amount", 500);
        assert_eq!(
            build(&op, &cfg).unwrap().body,
            r#"{"currency":"INR","amount":500}"#
        );
    }

    #[test]
    fn test_header_precedence() {
        let cfg = config(Credentials::basic("abc", "xyz"));
        let op = Operation::post("/orders")
            .with_header("x-team", "override")
            .with_header("content-type", "text/plain")
            .with_header("AUTHORIZATION", "Bearer forged");
        let built = build(&op, &cfg).unwrap();

        assert_eq!(find_header(&built.headers, "X-Team"), Some("override"));
        assert_eq!(find_header(&built.headers, "Content-Type"), Some("text/plain"));
        assert_eq!(
            find_header(&built.headers, "authorization"),
            Some("Basic YWJjOnh5eg==")
        );
        assert_eq!(find_header(&built.headers, "User-Agent"), Some(USER_AGENT));

        let authorization_count = built
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .count();
        assert_eq!(authorization_count, 1);
    }

    #[test]
    fn test_oauth_authorization() {
        let cfg = config(Credentials::oauth("tok123"));
        let built = build(&Operation::get("/orders"), &cfg).unwrap();
        assert_eq!(find_header(&built.headers, "Authorization"), Some("Bearer tok123"));
    }

    #[test]
    fn test_timeout_override_and_query_passthrough() {
        let cfg = config(Credentials::basic("abc", "xyz"));
        let op = Operation::get("/payments")
            .with_query("from", "1700000000")
            .with_query("expand[]", "card")
            .with_timeout(Duration::from_secs(5));
        let built = build(&op, &cfg).unwrap();

        assert_eq!(built.options.timeout, Duration::from_secs(5));
        assert_eq!(built.options.query[1], ("expand[]".to_owned(), "card".to_owned()));

        let default = build(&Operation::get("/payments"), &cfg).unwrap();
        assert_eq!(default.options.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_try_with_body_accepts_structs() {
        #[derive(Serialize)]
        struct NewOrder<'a> {
            amount: u64,
            currency: &'a str,
        }

        let op = Operation::post("/orders")
            .try_with_body(&NewOrder {
                amount: 500,
                currency: "INR",
            })
            .unwrap();
        assert_eq!(op.body["amount"], json!(500));
    }

    #[test]
    fn test_try_with_body_rejects_unencodable_values() {
        let mut bad: BTreeMap<Vec<u8>, u8> = BTreeMap::new();
        bad.insert(vec![1, 2], 3);
        let err = Operation::post("/orders").try_with_body(&bad).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));

        let err = Operation::post("/orders").try_with_body(&[1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
