//! Client configuration.
//!
//! [`Config`] holds values set explicitly at runtime. Every setting is
//! resolved at call time in the order: explicit value, environment
//! variable, hard-coded default. Missing credentials are only reported
//! when a call actually needs them.
//!
//! # Environment Variables
//!
//! - `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET` - basic-auth key pair
//! - `RAZORPAY_ACCESS_TOKEN` - OAuth bearer token
//! - `RAZORPAY_AUTH_MODE` - `basic` (default) or `oauth`
//! - `RAZORPAY_API_BASE_URL` - API host (default: `https://api.razorpay.com/v1`)
//! - `RAZORPAY_AUTH_BASE_URL` - OAuth host (default: `https://auth.razorpay.com`)
//! - `RAZORPAY_TIMEOUT_MS` - request timeout in milliseconds (default: `30000`)

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::prelude::*;

use crate::error::ConfigError;

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com/v1";

/// Default OAuth base URL.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://auth.razorpay.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_KEY_ID: &str = "RAZORPAY_KEY_ID";
const ENV_KEY_SECRET: &str = "RAZORPAY_KEY_SECRET";
const ENV_ACCESS_TOKEN: &str = "RAZORPAY_ACCESS_TOKEN";
const ENV_AUTH_MODE: &str = "RAZORPAY_AUTH_MODE";
const ENV_API_BASE_URL: &str = "RAZORPAY_API_BASE_URL";
const ENV_AUTH_BASE_URL: &str = "RAZORPAY_AUTH_BASE_URL";
const ENV_TIMEOUT_MS: &str = "RAZORPAY_TIMEOUT_MS";

/// Source of environment values consulted during resolution.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthMode {
    /// HTTP basic auth with a key id and key secret.
    #[default]
    Basic,
    /// Bearer token obtained through the OAuth flow.
    OAuth,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "oauth" => Ok(Self::OAuth),
            _ => Err(ConfigError::InvalidValue {
                name: ENV_AUTH_MODE,
                value: s.to_owned(),
            }),
        }
    }
}

/// Credentials for exactly one auth mode.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Key id and key secret.
    Basic {
        /// Public key id (`rzp_live_...` / `rzp_test_...`).
        key_id: String,
        /// Key secret.
        key_secret: String,
    },
    /// OAuth access token.
    OAuth {
        /// Bearer token.
        access_token: String,
    },
}

impl Credentials {
    /// Creates basic-auth credentials.
    #[must_use]
    pub fn basic(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self::Basic {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// Creates OAuth credentials.
    #[must_use]
    pub fn oauth(access_token: impl Into<String>) -> Self {
        Self::OAuth {
            access_token: access_token.into(),
        }
    }

    /// Returns the mode these credentials authenticate with.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        match self {
            Self::Basic { .. } => AuthMode::Basic,
            Self::OAuth { .. } => AuthMode::OAuth,
        }
    }

    /// Computes the `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> String {
        match self {
            Self::Basic { key_id, key_secret } => {
                let token = BASE64_STANDARD.encode(format!("{key_id}:{key_secret}"));
                format!("Basic {token}")
            }
            Self::OAuth { access_token } => format!("Bearer {access_token}"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { key_id, .. } => f
                .debug_struct("Basic")
                .field("key_id", key_id)
                .finish_non_exhaustive(),
            Self::OAuth { .. } => f.debug_struct("OAuth").finish_non_exhaustive(),
        }
    }
}

/// Explicit runtime configuration.
///
/// Unset fields fall back to the environment and then to defaults when the
/// configuration is [resolved](Config::resolve).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use razorpay::config::Config;
///
/// let config = Config::basic("rzp_test_abc", "secret")
///     .with_header("X-Razorpay-Account", "acc_123")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Clone, Default)]
pub struct Config {
    key_id: Option<String>,
    key_secret: Option<String>,
    access_token: Option<String>,
    auth_mode: Option<AuthMode>,
    custom_headers: Vec<(String, String)>,
    api_base_url: Option<String>,
    auth_base_url: Option<String>,
    timeout: Option<Duration>,
    env: Option<EnvLookup>,
}

impl Config {
    /// Creates an empty config; everything resolves from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config using basic auth with the given key pair.
    #[must_use]
    pub fn basic(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self::new()
            .with_auth_mode(AuthMode::Basic)
            .with_key(key_id, key_secret)
    }

    /// Creates a config using OAuth with the given access token.
    #[must_use]
    pub fn oauth(access_token: impl Into<String>) -> Self {
        Self::new()
            .with_auth_mode(AuthMode::OAuth)
            .with_access_token(access_token)
    }

    /// Sets the basic-auth key pair.
    #[must_use]
    pub fn with_key(mut self, key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self.key_secret = Some(key_secret.into());
        self
    }

    /// Sets the OAuth access token.
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Selects the auth mode.
    #[must_use]
    pub const fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = Some(mode);
        self
    }

    /// Adds a custom header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the OAuth base URL.
    #[must_use]
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = Some(url.into());
        self
    }

    /// Sets the default request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads environment values from `lookup` instead of the process
    /// environment. Applies to every later [`Config::resolve`].
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Some(Arc::new(lookup));
        self
    }

    /// Resolves the configuration against the environment: the lookup set
    /// by [`Config::with_env_lookup`], or the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a credential required by the active auth
    /// mode is missing, or if an environment value cannot be parsed.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        match &self.env {
            Some(lookup) => self.resolve_with(|name| lookup(name)),
            None => self.resolve_with(|name| std::env::var(name).ok()),
        }
    }

    /// Resolves only the credentials for the active auth mode.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.resolve().map(|resolved| resolved.credentials)
    }

    /// Resolves the configuration using `lookup` in place of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: &Option<String>, var: &str| {
            explicit
                .clone()
                .or_else(|| lookup(var).filter(|v| !v.is_empty()))
        };

        let auth_mode = match self.auth_mode {
            Some(mode) => mode,
            None => lookup(ENV_AUTH_MODE)
                .filter(|v| !v.is_empty())
                .map_or(Ok(AuthMode::default()), |v| v.parse())?,
        };

        let credentials = match auth_mode {
            AuthMode::Basic => Credentials::Basic {
                key_id: pick(&self.key_id, ENV_KEY_ID)
                    .ok_or(ConfigError::MissingCredential("key_id", ENV_KEY_ID))?,
                key_secret: pick(&self.key_secret, ENV_KEY_SECRET)
                    .ok_or(ConfigError::MissingCredential("key_secret", ENV_KEY_SECRET))?,
            },
            AuthMode::OAuth => Credentials::OAuth {
                access_token: pick(&self.access_token, ENV_ACCESS_TOKEN).ok_or(
                    ConfigError::MissingCredential("access_token", ENV_ACCESS_TOKEN),
                )?,
            },
        };

        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => match lookup(ENV_TIMEOUT_MS).filter(|v| !v.is_empty()) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| ConfigError::InvalidValue {
                        name: ENV_TIMEOUT_MS,
                        value: raw,
                    })?,
                None => DEFAULT_TIMEOUT,
            },
        };

        Ok(ResolvedConfig {
            credentials,
            custom_headers: self.custom_headers.clone(),
            api_base_url: pick(&self.api_base_url, ENV_API_BASE_URL)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
            auth_base_url: pick(&self.auth_base_url, ENV_AUTH_BASE_URL)
                .unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.to_owned()),
            timeout,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("key_id", &self.key_id)
            .field("has_key_secret", &self.key_secret.is_some())
            .field("has_access_token", &self.access_token.is_some())
            .field("auth_mode", &self.auth_mode)
            .field("custom_headers", &self.custom_headers)
            .field("api_base_url", &self.api_base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("timeout", &self.timeout)
            .field("has_env_lookup", &self.env.is_some())
            .finish()
    }
}

/// A fully resolved configuration snapshot used for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Credentials for the active auth mode.
    pub credentials: Credentials,
    /// Headers added to every request, in insertion order.
    pub custom_headers: Vec<(String, String)>,
    /// Base URL for API calls.
    pub api_base_url: String,
    /// Base URL for OAuth calls.
    pub auth_base_url: String,
    /// Default request timeout.
    pub timeout: Duration,
}
