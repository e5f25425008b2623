//! Client configuration
//!
//! Settings come from three layers, later ones winning: a YAML or JSON
//! config file, environment variables, then command line flags.

use crate::engine::{CollectConfig, DEFAULT_MAX_OFFSET, DEFAULT_WINDOW};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the audit API endpoint
pub const ENV_ENDPOINT: &str = "HERMES_ENDPOINT";
/// Environment variable holding a pre-issued token
pub const ENV_TOKEN: &str = "OS_AUTH_TOKEN";
pub const ENV_PROJECT_ID: &str = "OS_PROJECT_ID";
pub const ENV_DOMAIN_ID: &str = "OS_DOMAIN_ID";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the audit API, e.g. `https://hermes.example.com/v1`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Token sent as `X-Auth-Token`
    #[serde(default)]
    pub token: Option<String>,

    /// Project scope
    #[serde(default)]
    pub project_id: Option<String>,

    /// Domain scope
    #[serde(default)]
    pub domain_id: Option<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Event collection settings
    #[serde(default)]
    pub collect: CollectSettings,
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for throttled or failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rps() -> u32 {
    10
}

fn default_burst() -> u32 {
    10
}

/// Event collection settings
///
/// Only needed against deployments whose offset ceiling differs from the
/// stock one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectSettings {
    #[serde(default = "default_max_offset")]
    pub max_offset: u32,

    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            max_offset: default_max_offset(),
            window: default_window(),
        }
    }
}

fn default_max_offset() -> u32 {
    DEFAULT_MAX_OFFSET
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Load a config file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        };
        parsed.with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values do not override.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).none_if_empty();

        if let Some(endpoint) = var(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Some(token) = var(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(project_id) = var(ENV_PROJECT_ID) {
            self.project_id = Some(project_id);
        }
        if let Some(domain_id) = var(ENV_DOMAIN_ID) {
            self.domain_id = Some(domain_id);
        }
        self
    }

    /// Check the config is complete enough to talk to the API
    pub fn validate(&self) -> Result<()> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| Error::missing_field("endpoint"))?;

        let url = url::Url::parse(endpoint)
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_value("http.timeout_secs", "must be positive"));
        }
        if self.collect.max_offset == 0 {
            return Err(Error::invalid_value(
                "collect.max_offset",
                "must be positive",
            ));
        }

        Ok(())
    }

    /// HTTP client configuration for these settings
    pub fn http_client_config(&self) -> Result<HttpClientConfig> {
        self.validate()?;

        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries)
            .rate_limit(RateLimiterConfig::new(
                self.http.requests_per_second,
                self.http.burst_size,
            ));
        if let Some(endpoint) = &self.endpoint {
            builder = builder.base_url(endpoint.trim());
        }
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.auth_token(token);
        }

        Ok(builder.build())
    }

    /// Collection configuration for these settings
    pub fn collect_config(&self) -> CollectConfig {
        CollectConfig::new()
            .with_max_offset(self.collect.max_offset)
            .with_window(self.collect.window)
    }
}
