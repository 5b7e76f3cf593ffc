//! Configuration management for PartLookup services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Startup catalog sources
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Query engine configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Document processing configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,

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

    /// Maximum accepted request body (admin uploads) in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Files read once at startup to populate the catalog.
///
/// Every path is optional; a missing file leaves that part of the catalog empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Spreadsheet-derived records (JSON array or CSV export)
    pub structured_path: Option<PathBuf>,

    /// Processed documents file written by the `ingest` binary
    pub documents_path: Option<PathBuf>,

    /// Image mapping file (document name -> extracted images)
    pub images_path: Option<PathBuf>,

    /// Prefix applied to relative image paths
    pub image_base_dir: Option<String>,
}

impl CatalogConfig {
    /// Resolve an image path against the configured base directory
    pub fn image_path(&self, relative: &str) -> String {
        match self.image_base_dir.as_deref() {
            Some(base) if !relative.starts_with('/') && !relative.contains("://") => {
                format!("{}/{}", base.trim_end_matches('/'), relative.trim_start_matches("./"))
            }
            _ => relative.to_string(),
        }
    }
}

/// How relevance tiers are applied inside each priority group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Keep catalog order inside every group
    Stable,
    /// Rank only when the search targets a single origin
    #[default]
    SingleOrigin,
    /// Always rank inside each group
    Always,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Hard cap on returned results
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default)]
    pub ranking: RankingPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// Directory scanned for PDF manuals
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,

    /// Where the processed documents file is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Descriptions are cut to this many characters
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,

    /// Raw line excerpts are cut to this many characters
    #[serde(default = "default_max_context_len")]
    pub max_context_len: usize,

    /// Shortest description accepted from a document line
    #[serde(default = "default_min_description_len")]
    pub min_description_len: usize,

    /// Characters of extracted text kept per document for inspection
    #[serde(default = "default_text_sample_len")]
    pub text_sample_len: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Install the Prometheus recorder and serve /metrics
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (global)
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
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_body_bytes() -> usize { 32 * 1024 * 1024 }
fn default_max_results() -> usize { crate::DEFAULT_MAX_RESULTS }
fn default_pdf_dir() -> PathBuf { PathBuf::from("data/pdfs") }
fn default_output_path() -> PathBuf { PathBuf::from("data/processed/pdfs-data.json") }
fn default_max_description_len() -> usize { 200 }
fn default_max_context_len() -> usize { 150 }
fn default_min_description_len() -> usize { 11 }
fn default_text_sample_len() -> usize { 5000 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            ranking: RankingPolicy::default(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            pdf_dir: default_pdf_dir(),
            output_path: default_output_path(),
            max_description_len: default_max_description_len(),
            max_context_len: default_max_context_len(),
            min_description_len: default_min_description_len(),
            text_sample_len: default_text_sample_len(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_enabled(),
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
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SEARCH__MAX_RESULTS=50
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.max_results, 100);
        assert_eq!(config.search.ranking, RankingPolicy::SingleOrigin);
        assert_eq!(config.ingestion.max_description_len, 200);
        assert!(config.catalog.structured_path.is_none());
    }

    #[test]
    fn test_request_timeout() {
        let mut config = AppConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));

        config.server.request_timeout_secs = 5;
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = Config::builder()
            .set_default("search.max_results", 25)
            .unwrap()
            .set_default("search.ranking", "always")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.search.max_results, 25);
        assert_eq!(config.search.ranking, RankingPolicy::Always);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_image_path_resolution() {
        let mut catalog = CatalogConfig::default();
        assert_eq!(catalog.image_path("data/images/a.png"), "data/images/a.png");

        catalog.image_base_dir = Some("/static/".to_string());
        assert_eq!(catalog.image_path("./data/images/a.png"), "/static/data/images/a.png");
        assert_eq!(catalog.image_path("/abs/a.png"), "/abs/a.png");
        assert_eq!(catalog.image_path("https://cdn/a.png"), "https://cdn/a.png");
    }
}
