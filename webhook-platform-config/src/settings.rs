//! Typed settings for the platform API client and for webhook receivers.
//!
//! Both structs are built from a flat key/value map so that environment
//! variables, `.env` files and JSON/TOML files feed the same code path.

use crate::{ConfigError, ConfigValidator, EnvLoader, Result, Validate, load_file};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default signature tolerance window (5 minutes)
pub const DEFAULT_TOLERANCE_MS: i64 = 300_000;

/// Settings for talking to the webhook platform API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// API key sent as `X-API-Key`
    pub api_key: String,

    /// Base URL without trailing slash
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User-Agent for outgoing requests
    pub user_agent: String,
}

impl PlatformConfig {
    /// Create a configuration with the default base URL and timeout.
    ///
    /// Fails with `"API key is required"` when `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Start a builder
    pub fn builder(api_key: impl Into<String>) -> PlatformConfigBuilder {
        PlatformConfigBuilder::new(api_key)
    }

    /// Load from `WEBHOOK_PLATFORM_*` variables, reading `.env` first
    pub fn from_env() -> Result<Self> {
        let vars = EnvLoader::default().load_with_dotenv(None)?;
        Self::from_vars(&vars)
    }

    /// Build from already-collected environment variables
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_map(&string_map(vars))
    }

    /// Load from a JSON, TOML or `.env` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_map(&load_file(path.as_ref())?)
    }

    /// Build from a flat settings map (`api_key`, `base_url`, `timeout_secs`, `user_agent`)
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut builder = Self::builder(read_string(map, "api_key")?.unwrap_or_default());
        if let Some(base_url) = read_string(map, "base_url")? {
            builder = builder.base_url(base_url);
        }
        if let Some(secs) = read_u64(map, "timeout_secs")?.or(read_u64(map, "timeout")?) {
            builder = builder.timeout_secs(secs);
        }
        if let Some(user_agent) = read_string(map, "user_agent")? {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }

    /// Join the base URL with an API path such as `/api/v1/events`
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Validate for PlatformConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "API key is required".to_string(),
            ));
        }
        ConfigValidator::is_url(&self.base_url, "base_url")?;
        ConfigValidator::in_range(self.timeout.as_secs(), 1, 3600, "timeout")?;
        Ok(())
    }
}

/// Builder for [`PlatformConfig`]
#[derive(Debug, Clone)]
pub struct PlatformConfigBuilder {
    config: PlatformConfig,
}

impl PlatformConfigBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: PlatformConfig {
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                user_agent: format!("webhook-platform-rust/{}", env!("CARGO_PKG_VERSION")),
            },
        }
    }

    /// Set the base URL; trailing slashes are stripped
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = Duration::from_secs(secs);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<PlatformConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Settings a receiving service needs to verify inbound webhooks
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverSettings {
    /// Endpoint signing secret
    pub secret: String,

    /// Maximum allowed drift in milliseconds
    pub tolerance_ms: i64,
}

impl ReceiverSettings {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let settings = Self {
            secret: secret.into(),
            tolerance_ms: DEFAULT_TOLERANCE_MS,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_tolerance_ms(mut self, tolerance_ms: i64) -> Result<Self> {
        self.tolerance_ms = tolerance_ms;
        self.validate()?;
        Ok(self)
    }

    /// Load from `WEBHOOK_PLATFORM_WEBHOOK_SECRET` / `_WEBHOOK_TOLERANCE_MS`
    pub fn from_env() -> Result<Self> {
        let vars = EnvLoader::default().load_with_dotenv(None)?;
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_map(&string_map(vars))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_map(&load_file(path.as_ref())?)
    }

    /// Build from a flat settings map (`webhook_secret`, `webhook_tolerance_ms`)
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let secret = read_string(map, "webhook_secret")?
            .ok_or_else(|| ConfigError::KeyNotFound("webhook_secret".to_string()))?;
        let mut settings = Self::new(secret)?;
        if let Some(tolerance) = read_u64(map, "webhook_tolerance_ms")? {
            let tolerance = i64::try_from(tolerance).map_err(|_| ConfigError::InvalidValue {
                key: "webhook_tolerance_ms".to_string(),
                message: "value too large".to_string(),
            })?;
            settings = settings.with_tolerance_ms(tolerance)?;
        }
        Ok(settings)
    }
}

impl Validate for ReceiverSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.secret, "webhook_secret")?;
        if self.tolerance_ms < 0 {
            return Err(ConfigError::ValidationError(
                "webhook_tolerance_ms cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// Keeps the secret out of logs and panic messages.
impl std::fmt::Debug for ReceiverSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverSettings")
            .field("secret", &"<redacted>")
            .field("tolerance_ms", &self.tolerance_ms)
            .finish()
    }
}

fn string_map(vars: &HashMap<String, String>) -> Map<String, Value> {
    vars.iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

fn read_string(map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "expected a string".to_string(),
        }),
    }
}

// Accepts both JSON/TOML numbers and numeric strings from the environment.
fn read_u64(map: &Map<String, Value>, key: &str) -> Result<Option<u64>> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    };
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid("expected a non-negative integer")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid("expected a non-negative integer")),
        Some(_) => Err(invalid("expected a non-negative integer")),
    }
}
