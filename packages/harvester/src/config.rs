//! Harvester configuration.
//!
//! One explicit struct handed to the fetcher, store and driver constructors.
//! Nothing in the library reads the environment except `from_env`.

use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HarvestError, Result};
use crate::types::checkpoint::DEFAULT_CHECKPOINT_STRIDE;

/// Placeholder substituted with the scanned identifier.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Default upstream product detail endpoint.
pub const DEFAULT_PRODUCT_URL: &str = "https://www.woolworths.com.au/apis/ui/product/detail/{id}";

/// Configuration for a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Record store connection string (required by the binary only)
    pub database_url: Option<String>,

    /// Maximum pooled store connections
    pub max_connections: u32,

    /// Store identifier stamped on every record
    pub store_id: String,

    /// Product URL template containing `{id}`
    pub product_url: String,

    /// Added to both checkpoint bounds after a completed run
    pub checkpoint_stride: i64,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// User agent sent upstream
    pub user_agent: String,

    /// Minimum spacing between request starts (not a backoff)
    pub request_delay: Duration,

    /// Activity log file; `None` disables file logging
    pub activity_log: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            store_id: "W01".to_string(),
            product_url: DEFAULT_PRODUCT_URL.to_string(),
            checkpoint_stride: DEFAULT_CHECKPOINT_STRIDE,
            request_timeout: Duration::from_secs(30),
            user_agent: "PantrilistHarvester/1.0".to_string(),
            request_delay: Duration::ZERO,
            activity_log: Some(PathBuf::from("ItemLog.txt")),
        }
    }
}

impl HarvestConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `.env` if present (development). Unset variables keep their
    /// defaults; malformed values are errors.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let mut config = Self::default();
        config.database_url = env::var("DATABASE_URL").ok();

        if let Some(v) = env_opt("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = env_opt("HARVEST_STORE_ID") {
            config.store_id = v;
        }
        if let Some(v) = env_opt("HARVEST_PRODUCT_URL") {
            config.product_url = v;
        }
        if let Some(v) = env_opt("HARVEST_CHECKPOINT_STRIDE") {
            config.checkpoint_stride = parse_var("HARVEST_CHECKPOINT_STRIDE", &v)?;
        }
        if let Some(v) = env_opt("HARVEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_var("HARVEST_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = env_opt("HARVEST_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = env_opt("HARVEST_REQUEST_DELAY_MS") {
            config.request_delay =
                Duration::from_millis(parse_var("HARVEST_REQUEST_DELAY_MS", &v)?);
        }
        if let Some(v) = env_opt("HARVEST_ACTIVITY_LOG") {
            config.activity_log = match v.as_str() {
                "off" | "none" => None,
                path => Some(PathBuf::from(path)),
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that would otherwise surface mid-run.
    pub fn validate(&self) -> Result<()> {
        if self.store_id.trim().is_empty() {
            return Err(HarvestError::config("HARVEST_STORE_ID", "must not be empty"));
        }
        if self.checkpoint_stride <= 0 {
            return Err(HarvestError::config(
                "HARVEST_CHECKPOINT_STRIDE",
                "must be positive",
            ));
        }
        url::Url::parse(&self.product_url_for(0))
            .map_err(|e| HarvestError::config("HARVEST_PRODUCT_URL", e.to_string()))?;
        Ok(())
    }

    /// Database URL, or a config error if unset.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| HarvestError::config("DATABASE_URL", "must be set"))
    }

    /// Product URL for one identifier.
    ///
    /// Templates without `{id}` get the identifier appended.
    pub fn product_url_for(&self, id: i64) -> String {
        if self.product_url.contains(ID_PLACEHOLDER) {
            self.product_url.replace(ID_PLACEHOLDER, &id.to_string())
        } else {
            format!("{}{}", self.product_url, id)
        }
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = store_id.into();
        self
    }

    pub fn with_product_url(mut self, template: impl Into<String>) -> Self {
        self.product_url = template.into();
        self
    }

    pub fn with_checkpoint_stride(mut self, stride: i64) -> Self {
        self.checkpoint_stride = stride;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_activity_log(mut self, path: Option<PathBuf>) -> Self {
        self.activity_log = path;
        self
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| HarvestError::config(key, e.to_string()))
}
