//! Configuration for the webhook platform.
//!
//! Settings come from three places, all normalized to the same flat
//! lowercase key space:
//!
//! - process environment variables prefixed with `WEBHOOK_PLATFORM_`
//! - a `.env` file (loaded through `dotenvy`)
//! - a JSON, TOML or `.env` settings file
//!
//! ```rust,no_run
//! use webhook_platform_config::{PlatformConfig, ReceiverSettings};
//!
//! let client = PlatformConfig::builder("api_key_123")
//!     .base_url("https://hooks.example.com/")
//!     .timeout_secs(10)
//!     .build()?;
//! assert_eq!(client.base_url, "https://hooks.example.com");
//!
//! let receiver = ReceiverSettings::from_env()?;
//! # Ok::<(), webhook_platform_config::ConfigError>(())
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOLERANCE_MS, PlatformConfig,
    PlatformConfigBuilder, ReceiverSettings,
};
pub use validation::{ConfigValidator, Validate};

use serde_json::{Map, Value};
use std::path::Path;

/// Environment variable prefix used by [`EnvLoader::default`]
pub const DEFAULT_ENV_PREFIX: &str = "WEBHOOK_PLATFORM";

/// Load a settings file, detecting its format from the file name
pub fn load_file(path: &Path) -> Result<Map<String, Value>> {
    let loader = ConfigLoader::auto(path)?;
    let map = loader.load_file(path)?;
    tracing::debug!(path = %path.display(), keys = map.len(), "loaded settings file");
    Ok(map)
}
