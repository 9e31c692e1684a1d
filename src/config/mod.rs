//! Configuration management for the slotsync service
//!
//! Configuration is loaded from environment variables or a TOML file.
//! The partner API base URL and key have no defaults: startup is fatal
//! without them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Partner API configuration
    pub partner: PartnerConfig,

    /// Admission gate configuration
    pub gate: GateConfig,

    /// Sync configuration
    pub sync: SyncConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Partner API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerConfig {
    /// Base URL of the partner inventory API
    pub base_url: String,

    /// API key sent in the x-api-key header
    pub api_key: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Admission gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Maximum number of in-flight partner calls, process-wide
    pub max_concurrent: usize,

    /// Minimum milliseconds between dispatch start times
    pub min_interval_ms: u64,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Product ids fetched by every lane
    pub product_ids: Vec<String>,

    /// Chunk size in days for the medium and coarse lanes
    pub chunk_days: u32,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the control/read API
    pub bind_addr: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `PARTNER_API_URL` and `PARTNER_API_KEY` are required; everything
    /// else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("PARTNER_API_URL").context("PARTNER_API_URL must be set")?;
        let api_key = std::env::var("PARTNER_API_KEY").context("PARTNER_API_KEY must be set")?;

        let request_timeout_secs = std::env::var("SLOTSYNC_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let max_concurrent = std::env::var("SLOTSYNC_MAX_CONCURRENT_CALLS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5);

        let min_interval_ms = std::env::var("SLOTSYNC_MIN_CALL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(2000);

        let product_ids = std::env::var("SLOTSYNC_PRODUCT_IDS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![String::from("14"), String::from("15")]);

        let chunk_days = std::env::var("SLOTSYNC_CHUNK_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let sqlite_path = std::env::var("SLOTSYNC_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/inventory.db"))
            .into();

        let bind_addr =
            std::env::var("SLOTSYNC_BIND_ADDR").unwrap_or_else(|_| String::from("0.0.0.0:3000"));

        let log_level =
            std::env::var("SLOTSYNC_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format =
            std::env::var("SLOTSYNC_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            partner: PartnerConfig {
                base_url,
                api_key,
                request_timeout_secs,
            },
            gate: GateConfig {
                max_concurrent,
                min_interval_ms,
            },
            sync: SyncConfig {
                product_ids,
                chunk_days,
            },
            database: DatabaseConfig { sqlite_path },
            server: ServerConfig { bind_addr },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.partner.base_url.is_empty() {
            anyhow::bail!("partner.base_url must not be empty");
        }

        if self.gate.max_concurrent == 0 {
            anyhow::bail!("gate.max_concurrent must be greater than 0");
        }

        if self.gate.min_interval_ms == 0 {
            anyhow::bail!("gate.min_interval_ms must be greater than 0");
        }

        if self.sync.product_ids.is_empty() {
            anyhow::bail!("sync.product_ids must not be empty");
        }

        if self.sync.chunk_days == 0 {
            anyhow::bail!("sync.chunk_days must be greater than 0");
        }

        Ok(())
    }

    /// Get partner request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.partner.request_timeout_secs)
    }

    /// Get gate minimum dispatch interval as Duration
    #[must_use]
    pub fn min_call_interval(&self) -> Duration {
        Duration::from_millis(self.gate.min_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            partner: PartnerConfig {
                base_url: String::from("http://localhost:9000"),
                api_key: String::new(),
                request_timeout_secs: 30,
            },
            gate: GateConfig {
                max_concurrent: 5,
                min_interval_ms: 2000,
            },
            sync: SyncConfig {
                product_ids: vec![String::from("14"), String::from("15")],
                chunk_days: 3,
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/inventory.db"),
            },
            server: ServerConfig {
                bind_addr: String::from("0.0.0.0:3000"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
