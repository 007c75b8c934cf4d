//! Configuration management for ztna-client.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gateway and policy engine endpoints.
    pub gateway: GatewaySection,
    /// Connectivity monitor settings.
    pub monitor: MonitorSection,
    /// Continuous authentication settings.
    pub auth: AuthSection,
    /// Activity log settings.
    pub activity: ActivitySection,
    /// Durable state settings.
    pub storage: StorageSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Gateway endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    /// Gateway control-plane base URL.
    pub base_url: String,
    /// Policy engine base URL.
    pub policy_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            policy_url: "http://localhost:5002".to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Connectivity monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Endpoint probed for reachability.
    pub probe_url: String,
    /// Seconds between active probes.
    pub probe_interval_secs: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            probe_url: "https://api64.ipify.org?format=json".to_string(),
            probe_interval_secs: 10,
        }
    }
}

/// Continuous authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Seconds between continuous-auth rounds.
    pub interval_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self { interval_secs: 120 }
    }
}

/// Activity log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySection {
    /// Entries retained before FIFO eviction.
    pub capacity: usize,
}

impl Default for ActivitySection {
    fn default() -> Self {
        Self {
            capacity: crate::activity::DEFAULT_CAPACITY,
        }
    }
}

/// Durable state configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding the persisted connection id.
    pub state_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            state_dir: std::env::temp_dir().join("ztna-client"),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ZTNA_CLIENT_GATEWAY_URL") {
            if !url.is_empty() {
                self.gateway.base_url = url;
            }
        }

        if let Ok(url) = std::env::var("ZTNA_CLIENT_POLICY_URL") {
            if !url.is_empty() {
                self.gateway.policy_url = url;
            }
        }

        if let Ok(dir) = std::env::var("ZTNA_CLIENT_STATE_DIR") {
            if !dir.is_empty() {
                self.storage.state_dir = PathBuf::from(dir);
            }
        }

        if let Ok(level) = std::env::var("ZTNA_CLIENT_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref url) = args.gateway_url {
            self.gateway.base_url = url.clone();
        }

        if let Some(ref url) = args.policy_url {
            self.gateway.policy_url = url.clone();
        }

        if let Some(ref dir) = args.state_dir {
            self.storage.state_dir = dir.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        config.validate()?;
        Ok(config)
    }

    /// Reject URLs the HTTP client could not possibly use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.gateway.base_url, &self.gateway.policy_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// Per-request timeout for gateway and policy calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.request_timeout_secs.max(1))
    }

    /// Interval between reachability probes.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.probe_interval_secs.max(1))
    }

    /// Interval between continuous-auth rounds.
    pub fn auth_interval(&self) -> Duration {
        Duration::from_secs(self.auth.interval_secs.max(1))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// URL without an http/https scheme.
    InvalidUrl(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidUrl(url) => write!(f, "invalid endpoint URL: {}", url),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gateway.base_url, "http://localhost:5001");
        assert_eq!(config.gateway.policy_url, "http://localhost:5002");
        assert_eq!(config.monitor.probe_interval_secs, 10);
        assert_eq!(config.auth.interval_secs, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "gateway": {
                "base_url": "https://gw.corp.example",
                "request_timeout_secs": 5
            },
            "auth": {
                "interval_secs": 60
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.gateway.base_url, "https://gw.corp.example");
        assert_eq!(config.gateway.request_timeout_secs, 5);
        assert_eq!(config.auth.interval_secs, 60);
        // Untouched sections keep defaults
        assert_eq!(config.monitor.probe_interval_secs, 10);
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{
            "monitor": {
                "probe_interval_secs": 30
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.gateway.base_url, "http://localhost:5001"); // Default
        assert_eq!(config.monitor.probe_interval_secs, 30);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            gateway_url: Some("https://gw.example".to_string()),
            policy_url: Some("https://policy.example".to_string()),
            state_dir: Some(PathBuf::from("/var/lib/ztna")),
            log_level: Some("debug".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.gateway.base_url, "https://gw.example");
        assert_eq!(config.gateway.policy_url, "https://policy.example");
        assert_eq!(config.storage.state_dir, PathBuf::from("/var/lib/ztna"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_args_without_overrides_keep_config() {
        let mut config = Config::default();
        config.gateway.base_url = "https://from-file.example".to_string();

        config.apply_args(&Args::default());
        assert_eq!(config.gateway.base_url, "https://from-file.example");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = Config::default();
        config.gateway.base_url = "gw.example:5001".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.probe_interval(), Duration::from_secs(10));
        assert_eq!(config.auth_interval(), Duration::from_secs(120));
    }

    #[test]
    fn test_zero_intervals_clamped() {
        let mut config = Config::default();
        config.monitor.probe_interval_secs = 0;
        config.auth.interval_secs = 0;
        config.gateway.request_timeout_secs = 0;
        assert_eq!(config.probe_interval(), Duration::from_secs(1));
        assert_eq!(config.auth_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"base_url\""));
        assert!(json.contains("\"probe_url\""));
    }
}
