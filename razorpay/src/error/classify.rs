//! Gateway error classification.
//!
//! [`ErrorRegistry`] maps normalized error codes (see
//! [`crate::naming::type_name`]) to specific [`ErrorKind`] variants.
//! [`classify_error`] turns a decoded `error` object into an [`ApiError`],
//! falling back to [`ErrorKind::Generic`] when no variant is registered.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::LazyLock;

use serde_json::{Map, Value};

use super::{ApiError, ErrorKind, UNKNOWN_ERROR_CODE};
use crate::naming::type_name;

static DEFAULT_REGISTRY: LazyLock<ErrorRegistry> = LazyLock::new(ErrorRegistry::with_defaults);

/// Registry of specific error variants keyed by normalized code.
#[derive(Clone, Default)]
pub struct ErrorRegistry(HashMap<String, ErrorKind>);

impl Debug for ErrorRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_tuple("ErrorRegistry").field(&names).finish()
    }
}

impl ErrorRegistry {
    /// Creates an empty registry. Every code classifies as generic.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Creates a registry with the gateway's documented error variants.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register("BAD_REQUEST_ERROR", ErrorKind::BadRequest)
            .register("GATEWAY_ERROR", ErrorKind::Gateway)
            .register("SERVER_ERROR", ErrorKind::Server);
        registry
    }

    /// Returns the process-wide default registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &DEFAULT_REGISTRY
    }

    /// Registers `kind` for the given code. The code is normalized first,
    /// so `"BAD_REQUEST_ERROR"` and `"bad_request_error"` are equivalent.
    pub fn register(&mut self, code: &str, kind: ErrorKind) -> &mut Self {
        self.0.insert(type_name(code), kind);
        self
    }

    /// Looks up the variant for a raw code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<ErrorKind> {
        self.0.get(&type_name(code)).copied()
    }

    /// Classifies a decoded gateway `error` object.
    ///
    /// The code defaults to [`UNKNOWN_ERROR_CODE`] when absent or `null`;
    /// a non-string code is kept as its JSON text. Optional
    /// fields are copied verbatim when they are strings (or an object, for
    /// `metadata`) and left unset otherwise. A code with no registered
    /// variant yields [`ErrorKind::Generic`] with the original code.
    #[must_use]
    pub fn classify(&self, error: &Map<String, Value>, http_status: u16) -> ApiError {
        let code = match error.get("code") {
            None | Some(Value::Null) => UNKNOWN_ERROR_CODE.to_owned(),
            Some(Value::String(code)) => code.clone(),
            Some(other) => other.to_string(),
        };
        let kind = self.lookup(&code).unwrap_or(ErrorKind::Generic);

        ApiError {
            kind,
            code,
            description: string_field(error, "description"),
            field: string_field(error, "field"),
            step: string_field(error, "step"),
            reason: string_field(error, "reason"),
            metadata: error.get("metadata").and_then(Value::as_object).cloned(),
            http_status,
            raw_body: serde_json::to_string(error).ok(),
        }
    }
}

/// Classifies a gateway `error` object against the default registry.
#[must_use]
pub fn classify_error(error: &Map<String, Value>, http_status: u16) -> ApiError {
    ErrorRegistry::global().classify(error, http_status)
}

fn string_field(error: &Map<String, Value>, key: &str) -> Option<String> {
    error.get(key).and_then(Value::as_str).map(str::to_owned)
}
