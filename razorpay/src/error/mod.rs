//! Error types for the Razorpay client.
//!
//! Every failure crossing the public boundary is a [`enum@Error`]. Failures
//! reported by the gateway (or by the transport before the gateway could
//! answer) are carried by a single [`ApiError`] record whose [`ErrorKind`]
//! tells callers which branch of the pipeline produced it.

mod classify;

use serde_json::{Map, Value};

pub use classify::{ErrorRegistry, classify_error};

/// Code used when a gateway error object carries no `code`.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Base error type for Razorpay client operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The gateway (or the transport) reported a failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request body could not be encoded as a JSON object.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required body key for an endpoint was not supplied.
    #[error("missing required parameter `{key}` for endpoint `{endpoint}`")]
    MissingParameter {
        /// Endpoint name from the endpoint table.
        endpoint: &'static str,
        /// The absent body key.
        key: &'static str,
    },

    /// The number of path parameters does not match the endpoint template.
    #[error("endpoint `{endpoint}` expects {expected} path parameter(s), got {got}")]
    PathParameters {
        /// Endpoint name from the endpoint table.
        endpoint: &'static str,
        /// Number of `{}` placeholders in the template.
        expected: usize,
        /// Number of parameters supplied.
        got: usize,
    },
}

impl Error {
    /// Returns the gateway error record, if this is an API failure.
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Configuration errors, reported at the point of first use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A mandatory credential is not set explicitly or in the environment.
    #[error("missing credential `{0}`: set it on the config or via `{1}`")]
    MissingCredential(&'static str, &'static str),

    /// A configured value could not be interpreted.
    #[error("invalid value for `{name}`: {value:?}")]
    InvalidValue {
        /// Name of the setting or environment variable.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Failure reported by an [`HttpAdapter`](crate::transport::HttpAdapter)
/// before any HTTP status exists (connection refused, DNS, timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct TransportError {
    /// Human-readable failure reason.
    pub reason: String,
}

impl TransportError {
    /// Creates a new transport error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Which branch of the pipeline produced an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Transport failure; no HTTP status exists.
    Network,
    /// Success status with an undecodable body.
    InvalidJson,
    /// Failure status without a recognizable `error` object.
    Http,
    /// Gateway `BAD_REQUEST_ERROR`.
    BadRequest,
    /// Gateway `GATEWAY_ERROR`.
    Gateway,
    /// Gateway `SERVER_ERROR`.
    Server,
    /// Gateway error object whose code matches no known variant.
    Generic,
}

impl ErrorKind {
    /// Returns the fixed code string for kinds that have one.
    ///
    /// [`ErrorKind::Http`] and [`ErrorKind::Generic`] take their code from
    /// the response and return `None`.
    #[must_use]
    pub const fn code(self) -> Option<&'static str> {
        match self {
            Self::Network => Some("NETWORK_ERROR"),
            Self::InvalidJson => Some("INVALID_JSON"),
            Self::BadRequest => Some("BAD_REQUEST_ERROR"),
            Self::Gateway => Some("GATEWAY_ERROR"),
            Self::Server => Some("SERVER_ERROR"),
            Self::Http | Self::Generic => None,
        }
    }
}

/// A failed gateway call.
///
/// Constructed once per failed call and handed back to the caller; the
/// client never retries it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}{}", .code, description_suffix(.description.as_deref()))]
pub struct ApiError {
    /// Pipeline branch or gateway variant that produced the error.
    pub kind: ErrorKind,
    /// Error code as reported (or synthesized, e.g. `HTTP_502`).
    pub code: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Request field the gateway blamed.
    pub field: Option<String>,
    /// Payment step at which the failure happened.
    pub step: Option<String>,
    /// Machine-readable failure reason.
    pub reason: Option<String>,
    /// Extra metadata attached by the gateway.
    pub metadata: Option<Map<String, Value>>,
    /// HTTP status, `0` when the request never reached the gateway.
    pub http_status: u16,
    /// Serialized error object or raw body the error was built from.
    pub raw_body: Option<String>,
}

impl ApiError {
    /// Creates an error with the given kind, code and HTTP status.
    #[must_use]
    pub fn new(kind: ErrorKind, code: impl Into<String>, http_status: u16) -> Self {
        Self {
            kind,
            code: code.into(),
            description: None,
            field: None,
            step: None,
            reason: None,
            metadata: None,
            http_status,
            raw_body: None,
        }
    }

    /// Creates a `NETWORK_ERROR` for a transport failure.
    #[must_use]
    pub fn network(reason: &str) -> Self {
        Self::new(ErrorKind::Network, "NETWORK_ERROR", 0)
            .with_description(format!("Network error: {reason}"))
    }

    /// Creates an `INVALID_JSON` error for an undecodable success body.
    #[must_use]
    pub fn invalid_json(http_status: u16, detail: &serde_json::Error, body: &str) -> Self {
        Self::new(ErrorKind::InvalidJson, "INVALID_JSON", http_status)
            .with_description(format!("Invalid JSON response: {detail}"))
            .with_raw_body(body)
    }

    /// Creates an `HTTP_<status>` error for a failure without an `error`
    /// object.
    #[must_use]
    pub fn http(http_status: u16, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Http, format!("HTTP_{http_status}"), http_status)
            .with_description(description)
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_raw_body(mut self, raw_body: impl Into<String>) -> Self {
        self.raw_body = Some(raw_body.into());
        self
    }

    /// Returns the description, or an empty string when unset.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Returns `true` if the request never produced an HTTP status.
    #[must_use]
    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

/// Renders `": <description>"`, or nothing when the description is unset.
fn description_suffix(description: Option<&str>) -> String {
    description.map(|d| format!(": {d}")).unwrap_or_default()
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::network(&err.reason)
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Self::Api(err.into())
    }
}
