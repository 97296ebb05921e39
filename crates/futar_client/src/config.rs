//! FUTÁR client configuration

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FutarError;
use crate::params::DefaultingMode;

/// Public FUTÁR "where" API endpoint
pub const DEFAULT_BASE_URL: &str = "https://futar.bkk.hu/api/query/v1/ws/otp/api/where";

/// API version sent as `version` when a call does not override it
pub const DEFAULT_API_VERSION: u32 = 3;

/// Configuration for the FUTÁR client
///
/// Read by every call, never changed after the client is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FutarConfig {
    /// Base URL of the "where" API, without trailing endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (kept for future use, not transmitted)
    #[serde(default)]
    pub api_key: String,

    /// API version sent as the `version` query parameter
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Default for `includeReferences` on endpoints that accept it
    #[serde(default = "default_include_references")]
    pub include_references: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// IANA time zone used for `date`/`time` query fields
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// How per-call values fall back to defaults
    #[serde(default)]
    pub defaulting: DefaultingMode,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_api_version() -> u32 {
    DEFAULT_API_VERSION
}

const fn default_include_references() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("futar-client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_time_zone() -> String {
    "Europe/Budapest".to_string()
}

impl Default for FutarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            api_version: default_api_version(),
            include_references: default_include_references(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            time_zone: default_time_zone(),
            defaulting: DefaultingMode::default(),
        }
    }
}

impl FutarConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Load configuration from an optional `futar` file and `FUTAR_*` environment variables
    ///
    /// Environment variables override the file, e.g. `FUTAR_API_VERSION=4`.
    pub fn load() -> Result<Self, FutarError> {
        config::Config::builder()
            .add_source(config::File::with_name("futar").required(false))
            .add_source(config::Environment::with_prefix("FUTAR").try_parsing(true))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| FutarError::ConfigurationError(e.to_string()))
    }

    /// Parsed time zone
    pub fn tz(&self) -> Result<Tz, String> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| format!("unknown time zone: {}", self.time_zone))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        Url::parse(&self.base_url).map_err(|e| format!("base_url is not a valid URL: {e}"))?;

        if self.api_version == 0 {
            return Err("api_version must be greater than 0".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        self.tz()?;

        Ok(())
    }
}
