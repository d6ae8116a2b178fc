//! Response classification.
//!
//! [`classify`] decides success or failure from the HTTP status and turns
//! the body into either a reified [`Payload`] or an [`ApiError`].

use serde_json::Value;

use crate::entity::{EntityRegistry, Payload};
use crate::error::{ApiError, ErrorRegistry};
use crate::transport::RawResponse;

/// Classifies a raw response with the default registries.
///
/// # Errors
///
/// Returns an [`ApiError`] for non-2xx statuses and for 2xx responses whose
/// body is not valid JSON.
pub fn classify(response: &RawResponse) -> Result<Payload, ApiError> {
    Classifier::default().classify(response)
}

/// Response classifier bound to a pair of registries.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    entities: &'a EntityRegistry,
    errors: &'a ErrorRegistry,
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Self::new(EntityRegistry::global(), ErrorRegistry::global())
    }
}

impl<'a> Classifier<'a> {
    /// Creates a classifier over the given registries.
    #[must_use]
    pub const fn new(entities: &'a EntityRegistry, errors: &'a ErrorRegistry) -> Self {
        Self { entities, errors }
    }

    /// Classifies a raw response.
    ///
    /// - 2xx with an empty body: an empty-object payload.
    /// - 2xx with JSON: the reified payload.
    /// - 2xx with anything else: `INVALID_JSON` carrying the HTTP status.
    /// - other statuses: see [`Classifier::classify_failure`].
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] as described above.
    pub fn classify(&self, response: &RawResponse) -> Result<Payload, ApiError> {
        let status = response.status;
        if !(200..300).contains(&status) {
            return Err(self.classify_failure(status, &response.body));
        }

        let body = response.body.trim();
        if body.is_empty() {
            return Ok(Payload::empty());
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|err| ApiError::invalid_json(status, &err, &response.body))?;
        Ok(self.entities.reify(value))
    }

    /// Builds the error for a non-2xx response.
    ///
    /// A JSON body with an `error` object is classified by the error
    /// registry. Every other body yields `HTTP_<status>` with the body
    /// surfaced in the description.
    #[must_use]
    pub fn classify_failure(&self, status: u16, body: &str) -> ApiError {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return ApiError::http(status, format!("HTTP {status} with an empty response body"));
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(mut decoded)) => match decoded.remove("error") {
                Some(Value::Object(error)) => self.errors.classify(&error, status),
                Some(other) => {
                    decoded.insert("error".to_owned(), other);
                    unrecognized_body(status, &Value::Object(decoded))
                }
                None => unrecognized_body(status, &Value::Object(decoded)),
            },
            Ok(other) => unrecognized_body(status, &other),
            Err(_) => ApiError::http(status, format!("HTTP {status}: {trimmed}"))
                .with_raw_body(body),
        }
    }
}

fn unrecognized_body(status: u16, decoded: &Value) -> ApiError {
    ApiError::http(status, format!("HTTP {status}: {decoded}")).with_raw_body(decoded.to_string())
}
