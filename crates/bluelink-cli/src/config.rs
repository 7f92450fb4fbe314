//! CLI configuration types
//!
//! Layered as defaults, then the TOML file, then `BLUELINK_*` environment
//! variables (`BLUELINK_API__BASE_URL` sets `api.base_url`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BLUELINK";

/// Complete CLI configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueLinkConfig {
    /// Backend REST API
    #[serde(default)]
    pub api: ApiConfig,

    /// Chain the contract lives on
    #[serde(default)]
    pub network: NetworkConfig,

    /// Polling loop
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BlueLinkConfig {
    /// Load from `path` (optional) and the environment
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Keys that should be set before talking to a deployment
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api.base_url.trim().is_empty() {
            missing.push("api.base_url");
        }
        if is_blank(&self.network.rpc_url) {
            missing.push("network.rpc_url");
        }
        if is_blank(&self.network.package_id) {
            missing.push("network.package_id");
        }
        if self.network.clock_object_id.trim().is_empty() {
            missing.push("network.clock_object_id");
        }
        missing
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// Backend API settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the version prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size for token listings
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_base_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_page_limit() -> u32 {
    50
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_limit: default_page_limit(),
        }
    }
}

/// Chain settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// devnet, testnet or mainnet
    #[serde(default = "default_network")]
    pub name: String,

    /// Full node RPC URL
    pub rpc_url: Option<String>,

    /// Bond contract package id
    pub package_id: Option<String>,

    /// Shared clock object
    #[serde(default = "default_clock_object_id")]
    pub clock_object_id: String,
}

fn default_network() -> String {
    "devnet".to_string()
}

fn default_clock_object_id() -> String {
    "0x6".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network(),
            rpc_url: None,
            package_id: None,
            clock_object_id: default_clock_object_id(),
        }
    }
}

/// Polling loop settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between snapshot refreshes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    30
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
