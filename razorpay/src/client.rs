//! The gateway client.
//!
//! [`Client`] drives one call through the pipeline: snapshot the
//! configuration, [build](crate::request::build) the request, hand it to the
//! [`HttpAdapter`], then [classify](crate::response::Classifier) the
//! response. No retries happen here; callers own retry policy.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::entity::{EntityRegistry, Payload};
use crate::error::{ApiError, Error, ErrorRegistry};
use crate::request::{self, Operation};
use crate::response::Classifier;
use crate::transport::HttpAdapter;

/// Client for the gateway's REST API.
///
/// Cheap to clone; clones share the configuration, so
/// [`Client::set_config`] on one is seen by all of them from their next
/// call on.
///
/// # Example
///
/// ```ignore
/// use razorpay::client::Client;
/// use razorpay::config::Config;
/// use razorpay::request::Operation;
///
/// let client = Client::new(Config::basic("rzp_test_abc", "secret"), adapter);
/// let payment = client.execute(&Operation::get("/payments/pay_1")).await?;
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<RwLock<Arc<Config>>>,
    adapter: Arc<dyn HttpAdapter>,
    entities: Arc<EntityRegistry>,
    errors: Arc<ErrorRegistry>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config())
            .field("entities", &self.entities)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client over the given transport.
    pub fn new(config: Config, adapter: Arc<dyn HttpAdapter>) -> Self {
        Self {
            config: Arc::new(RwLock::new(Arc::new(config))),
            adapter,
            entities: Arc::new(EntityRegistry::global().clone()),
            errors: Arc::new(ErrorRegistry::global().clone()),
        }
    }

    /// Replaces the entity registry used for reification.
    #[must_use]
    pub fn with_entity_registry(mut self, registry: EntityRegistry) -> Self {
        self.entities = Arc::new(registry);
        self
    }

    /// Replaces the error registry used for classification.
    #[must_use]
    pub fn with_error_registry(mut self, registry: ErrorRegistry) -> Self {
        self.errors = Arc::new(registry);
        self
    }

    /// Returns the current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the configuration. Calls already in flight keep the
    /// snapshot they started with.
    pub fn set_config(&self, config: Config) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }

    /// Applies `update` to a copy of the configuration and installs it.
    pub fn update_config<F>(&self, update: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Config::clone(&guard);
        update(&mut next);
        *guard = Arc::new(next);
    }

    /// Dispatches a single operation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if credentials are missing or invalid;
    /// - [`Error::Encode`] if the body cannot be encoded;
    /// - [`Error::Api`] for transport failures (`NETWORK_ERROR`), non-2xx
    ///   responses and undecodable success bodies.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "razorpay.client.execute",
            skip_all,
            fields(
                method = %operation.method,
                path = %operation.path,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn execute(&self, operation: &Operation) -> Result<Payload, Error> {
        let result = self.dispatch(operation).await;
        record_result_on_span(&result);
        result
    }

    /// Dispatches a call described by an [`Endpoint`], filling its path
    /// template from `params` and appending `query`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathParameters`] or [`Error::MissingParameter`]
    /// before any network call if the arguments do not fit the endpoint,
    /// and otherwise the errors of [`Client::execute`].
    pub async fn call(
        &self,
        endpoint: &Endpoint,
        params: &[&str],
        body: Map<String, Value>,
        query: &[(&str, &str)],
    ) -> Result<Payload, Error> {
        let operation = query
            .iter()
            .fold(endpoint.operation(params, body)?, |operation, &(key, value)| {
                operation.with_query(key, value)
            });
        self.execute(&operation).await
    }

    async fn dispatch(&self, operation: &Operation) -> Result<Payload, Error> {
        let resolved = self.config().resolve()?;
        let request = request::build(operation, &resolved)?;

        let response = self
            .adapter
            .request(
                request.method,
                &request.url,
                &request.body,
                &request.headers,
                &request.options,
            )
            .await
            .map_err(ApiError::from)?;

        Ok(Classifier::new(&self.entities, &self.errors).classify(&response)?)
    }
}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R>(result: &Result<R, Error>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to gateway failed");
        }
    }
}

/// Records the outcome of a call on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_result_on_span<R>(_result: &Result<R, Error>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::error::{ConfigError, ErrorKind, TransportError};
    use crate::transport::{Method, RawResponse, RequestOptions, find_header};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Recorded {
        method: Method,
        url: String,
        body: String,
        headers: Vec<(String, String)>,
    }

    /// In-memory adapter returning a canned result and recording requests.
    struct MockAdapter {
        reply: Result<RawResponse, TransportError>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl MockAdapter {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(RawResponse::new(status, body)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(TransportError::new(reason)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpAdapter for MockAdapter {
        async fn request(
            &self,
            method: Method,
            url: &str,
            body: &str,
            headers: &[(String, String)],
            _options: &RequestOptions,
        ) -> Result<RawResponse, TransportError> {
            self.requests.lock().unwrap().push(Recorded {
                method,
                url: url.to_owned(),
                body: body.to_owned(),
                headers: headers.to_vec(),
            });
            self.reply.clone()
        }
    }

    fn config() -> Config {
        Config::basic("abc", "xyz").with_api_base_url("https://api.test/v1")
    }

    #[tokio::test]
    async fn test_fetch_payment() {
        let adapter =
            MockAdapter::replying(200, r#"{"id":"pay_1","entity":"payment","amount":500}"#);
        let client = Client::new(config(), adapter.clone());

        let payload = client.execute(&Operation::get("/payments/pay_1")).await.unwrap();
        let Some(Entity::Payment(payment)) = payload.into_entity() else {
            panic!("expected a payment");
        };
        assert_eq!(payment.id.as_deref(), Some("pay_1"));
        assert_eq!(payment.amount, Some(500));
        assert!(payment.status.is_none());
        assert!(payment.currency.is_none());

        let sent = adapter.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].url, "https://api.test/v1/payments/pay_1");
        assert_eq!(sent[0].body, "");
        assert_eq!(
            find_header(&sent[0].headers, "Authorization"),
            Some("Basic YWJjOnh5eg==")
        );
    }

    #[tokio::test]
    async fn test_create_order_bad_request() {
        let adapter = MockAdapter::replying(
            400,
            r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"Invalid amount"}}"#,
        );
        let client = Client::new(config(), adapter.clone());
        let operation = Operation::post("/orders")
            .with_param("amount", 500)
            .with_param("currency", "INR");

        let err = client.execute(&operation).await.unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.kind, ErrorKind::BadRequest);
        assert_eq!(api.description(), "Invalid amount");
        assert_eq!(api.http_status, 400);

        assert_eq!(adapter.requests()[0].body, r#"{"amount":500,"currency":"INR"}"#);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let client = Client::new(config(), MockAdapter::failing("connection refused"));

        let err = client.execute(&Operation::get("/orders")).await.unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.kind, ErrorKind::Network);
        assert_eq!(api.code, "NETWORK_ERROR");
        assert_eq!(api.http_status, 0);
        assert!(api.description().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_dispatch() {
        let adapter = MockAdapter::replying(200, "{}");
        let config = Config::new()
            .with_api_base_url("https://api.test/v1")
            .with_env_lookup(|_| None);
        let client = Client::new(config, adapter.clone());

        let err = client.execute(&Operation::get("/orders")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingCredential("key_id", "RAZORPAY_KEY_ID"))
        ));
        assert!(adapter.requests().is_empty());

        client.set_config(
            Config::new()
                .with_auth_mode(crate::config::AuthMode::OAuth)
                .with_env_lookup(|_| None),
        );
        let err = client.execute(&Operation::get("/orders")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingCredential("access_token", _))
        ));
        assert!(adapter.requests().is_empty());
    }

    #[tokio::test]
    async fn test_credentials_from_injected_env() {
        let adapter = MockAdapter::replying(200, "{}");
        let config = Config::new().with_env_lookup(|name| match name {
            "RAZORPAY_KEY_ID" => Some("abc".to_owned()),
            "RAZORPAY_KEY_SECRET" => Some("xyz".to_owned()),
            "RAZORPAY_API_BASE_URL" => Some("https://env.test/v1".to_owned()),
            _ => None,
        });
        let client = Client::new(config, adapter.clone());

        client.execute(&Operation::get("/orders")).await.unwrap();
        let sent = adapter.requests();
        assert_eq!(sent[0].url, "https://env.test/v1/orders");
        assert_eq!(
            find_header(&sent[0].headers, "Authorization"),
            Some("Basic YWJjOnh5eg==")
        );
    }

    #[tokio::test]
    async fn test_config_change_applies_to_next_call() {
        let adapter = MockAdapter::replying(200, "");
        let client = Client::new(config(), adapter.clone());

        client.execute(&Operation::get("/orders")).await.unwrap();
        client.set_config(Config::oauth("tok123").with_api_base_url("https://other.test"));
        client.execute(&Operation::get("/orders")).await.unwrap();
        client.update_config(|config| {
            *config = config.clone().with_header("X-Trace", "1");
        });
        client.execute(&Operation::get("/orders")).await.unwrap();

        let sent = adapter.requests();
        assert_eq!(sent[0].url, "https://api.test/v1/orders");
        assert_eq!(sent[1].url, "https://other.test/orders");
        assert_eq!(find_header(&sent[1].headers, "authorization"), Some("Bearer tok123"));
        assert_eq!(find_header(&sent[2].headers, "x-trace"), Some("1"));
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let client = Client::new(config(), MockAdapter::replying(200, ""));
        let payload = client.execute(&Operation::delete("/items/item_1")).await.unwrap();
        assert_eq!(payload, Payload::Value(json!({})));
    }

    #[tokio::test]
    async fn test_call_checks_required_keys_before_dispatch() {
        let adapter = MockAdapter::replying(200, "{}");
        let client = Client::new(config(), adapter.clone());
        let capture = crate::endpoint::endpoint("payments.capture").unwrap();

        let body = json!({"amount": 500}).as_object().cloned().unwrap();
        let err = client.call(capture, &["pay_1"], body, &[]).await.unwrap_err();
        assert!(matches!(err, Error::MissingParameter { key: "currency", .. }));
        assert!(adapter.requests().is_empty());

        let body = json!({"amount": 500, "currency": "INR"}).as_object().cloned().unwrap();
        client.call(capture, &["pay_1"], body, &[]).await.unwrap();
        assert_eq!(adapter.requests()[0].url, "https://api.test/v1/payments/pay_1/capture");
    }

    #[tokio::test]
    async fn test_custom_error_registry() {
        let adapter = MockAdapter::replying(400, r#"{"error":{"code":"BAD_REQUEST_ERROR"}}"#);
        let client = Client::new(config(), adapter).with_error_registry(ErrorRegistry::new());

        let err = client.execute(&Operation::get("/orders")).await.unwrap_err();
        assert_eq!(err.as_api().map(|e| e.kind), Some(ErrorKind::Generic));
    }
}
