//! Configuration management for Cartograph services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// External bibliographic sources (ORCID, Crossref)
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Persisted scholar/concept lists
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Compiled graph cache
    #[serde(default)]
    pub cache: CacheSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// ORCID public API base
    #[serde(default = "default_orcid_base")]
    pub orcid_base: String,

    /// Crossref REST API base
    #[serde(default = "default_crossref_base")]
    pub crossref_base: String,

    /// User agent sent to both APIs
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-exchange timeout in seconds; a timeout counts as a failed call
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,

    /// Shared outbound request budget
    #[serde(default = "default_source_rps")]
    pub requests_per_second: u32,

    /// Minimum token overlap between a record title and a Crossref hit
    #[serde(default = "default_min_title_similarity")]
    pub min_title_similarity: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// JSON array of `{ name, identifier, aliases }`
    pub scholars_path: Option<String>,

    /// JSON array of `{ term, aliases, definition, tags, seed_quotes }`
    pub concepts_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Redis URL; caching is disabled when unset
    pub redis_url: Option<String>,

    /// TTL for cached graphs in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Key prefix for namespacing
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 serves /metrics on the main router only)
    #[serde(default)]
    pub metrics_port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8787 }
fn default_request_timeout() -> u64 { 60 }
fn default_orcid_base() -> String { "https://pub.orcid.org/v3.0".to_string() }
fn default_crossref_base() -> String { "https://api.crossref.org".to_string() }
fn default_user_agent() -> String { format!("Cartograph/{} (+https://github.com/cartograph)", crate::VERSION) }
fn default_source_timeout() -> u64 { 5 }
fn default_source_rps() -> u32 { 12 }
fn default_min_title_similarity() -> f64 { 0.5 }
fn default_cache_ttl() -> u64 { 3600 }
fn default_key_prefix() -> String { "cartograph".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_rate_limit() -> u32 { 20 }
fn default_burst() -> u32 { 40 }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            orcid_base: default_orcid_base(),
            crossref_base: default_crossref_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_source_timeout(),
            requests_per_second: default_source_rps(),
            min_title_similarity: default_min_title_similarity(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_cache_ttl(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: 0,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SOURCES__TIMEOUT_SECS=10
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl SourcesConfig {
    /// Bound on one HTTP exchange, counted from when the request budget
    /// admits it
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sources: SourcesConfig::default(),
            catalog: CatalogConfig::default(),
            cache: CacheSettings::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
