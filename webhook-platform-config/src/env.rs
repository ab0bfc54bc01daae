// Environment variable loading

use crate::{ConfigError, DEFAULT_ENV_PREFIX, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Reads prefixed environment variables into a flat settings map.
///
/// `WEBHOOK_PLATFORM_API_KEY=...` becomes the key `api_key`. Variables
/// without the prefix are skipped.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a loader for the given prefix (without trailing underscore)
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix this loader strips
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Load `.env` first (missing file is fine), then the process environment
    pub fn load_with_dotenv(&self, path: Option<&Path>) -> Result<HashMap<String, String>> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                if dotenvy::dotenv().is_err() {
                    tracing::debug!("no .env file found, using process environment only");
                }
            }
        }
        Ok(self.load())
    }

    /// Load all prefixed variables from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.collect(env::vars())
    }

    /// Filter and normalize an arbitrary set of variables
    pub fn collect<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{}_", self.prefix);
        vars.into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&marker)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase(), value))
            })
            .collect()
    }

    /// Load a specific variable, e.g. `load_var("api_key")`
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_uppercase())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}
