//! Configuration module for tubesync.

use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, TubesyncError};

/// Environment variable that overrides `web.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "TUBESYNC_JWT_SECRET";

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/tubesync.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file output.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/tubesync.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Subscription sync and feed refresh configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Number of channel feeds fetched concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Cooldown between batches in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Page size requested from the subscription list endpoint.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on subscription pages fetched in one sync.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Timezone whose calendar day decides whether a channel is due.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Maximum stored video description length in characters.
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
}

fn default_batch_size() -> usize {
    4
}

fn default_batch_delay_ms() -> u64 {
    5000
}

fn default_page_size() -> u32 {
    50
}

fn default_max_pages() -> usize {
    100
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_max_description_length() -> usize {
    5000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            timezone: default_timezone(),
            max_description_length: default_max_description_length(),
        }
    }
}

impl SyncConfig {
    /// Cooldown between batches.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| TubesyncError::Config(format!("unknown timezone: {}", self.timezone)))
    }
}

/// YouTube endpoint and HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeConfig {
    /// Base URL of the Data API (without trailing slash).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// URL of the per-channel video feed.
    #[serde(default = "default_feed_base_url")]
    pub feed_base_url: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum feed document size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_feed_base_url() -> String {
    "https://www.youtube.com/feeds/videos.xml".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            feed_base_url: default_feed_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_feed_size_bytes: default_max_feed_size(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Secret used to verify bearer tokens.
    #[serde(default)]
    pub jwt_secret: String,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            jwt_secret: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Sync pipeline configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// YouTube client configuration.
    #[serde(default)]
    pub youtube: YoutubeConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TubesyncError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| TubesyncError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides (`TUBESYNC_JWT_SECRET`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var(JWT_SECRET_ENV) {
            if !jwt_secret.is_empty() {
                self.web.jwt_secret = jwt_secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(TubesyncError::Config(format!(
                "jwt_secret is not set. Set it in config.toml or via {JWT_SECRET_ENV}."
            )));
        }
        if self.sync.batch_size == 0 {
            return Err(TubesyncError::Config(
                "sync.batch_size must be at least 1".to_string(),
            ));
        }
        if self.sync.max_pages == 0 {
            return Err(TubesyncError::Config(
                "sync.max_pages must be at least 1".to_string(),
            ));
        }
        self.sync.tz()?;
        Ok(())
    }
}
