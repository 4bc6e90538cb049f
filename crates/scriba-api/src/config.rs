//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// API server configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Upload root directory
    pub upload_dir: PathBuf,
    /// Ledger file location
    pub ledger_path: PathBuf,
    /// Shared secret for the auth header
    pub api_key: String,
    /// Default engine model name
    pub default_model: String,
    /// Maximum artifact age before sweep
    pub max_artifact_age: Duration,
    /// Interval between periodic sweeps
    pub sweep_interval: Duration,
    /// Max request body size
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            upload_dir: PathBuf::from("uploads"),
            ledger_path: PathBuf::from("metadata.json"),
            api_key: String::new(),
            default_model: "base".to_string(),
            max_artifact_age: Duration::from_secs(86400),
            sweep_interval: Duration::from_secs(3600),
            max_body_size: 512 * 1024 * 1024, // 512MB uploads
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(default.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.port),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),
            ledger_path: std::env::var("LEDGER_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.ledger_path),
            api_key: std::env::var("API_KEY").unwrap_or(default.api_key),
            default_model: std::env::var("MODEL").unwrap_or(default.default_model),
            max_artifact_age: Duration::from_secs(
                std::env::var("MAX_AGE_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(86400),
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("SWEEP_INTERVAL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_body_size),
        }
    }
}
