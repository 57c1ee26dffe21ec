use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::model::MatchStrictness;

const ENV_CONFIG_PATH: &str = "ECO_GUARDIAN_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DEFAULT_OUTBREAK_SOURCE_SECS: u64 = 15;
const DEFAULT_FACILITY_INDEX_SECS: u64 = 30;
const DEFAULT_GEOCODING_SECS: u64 = 10;
const DEFAULT_ENVIRONMENT_SECS: u64 = 15;

/// Symptom matching configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingConfig {
    /// How input symptoms are compared against catalog symptoms
    #[serde(default)]
    pub strictness: MatchStrictness,
}

/// Per-upstream timeouts, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_outbreak_source_secs")]
    pub outbreak_source_secs: u64,
    #[serde(default = "default_facility_index_secs")]
    pub facility_index_secs: u64,
    #[serde(default = "default_geocoding_secs")]
    pub geocoding_secs: u64,
    #[serde(default = "default_environment_secs")]
    pub environment_secs: u64,
}

fn default_outbreak_source_secs() -> u64 {
    DEFAULT_OUTBREAK_SOURCE_SECS
}

fn default_facility_index_secs() -> u64 {
    DEFAULT_FACILITY_INDEX_SECS
}

fn default_geocoding_secs() -> u64 {
    DEFAULT_GEOCODING_SECS
}

fn default_environment_secs() -> u64 {
    DEFAULT_ENVIRONMENT_SECS
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            outbreak_source_secs: DEFAULT_OUTBREAK_SOURCE_SECS,
            facility_index_secs: DEFAULT_FACILITY_INDEX_SECS,
            geocoding_secs: DEFAULT_GEOCODING_SECS,
            environment_secs: DEFAULT_ENVIRONMENT_SECS,
        }
    }
}

impl TimeoutConfig {
    pub fn outbreak_source(&self) -> Duration {
        Duration::from_secs(self.outbreak_source_secs)
    }

    pub fn facility_index(&self) -> Duration {
        Duration::from_secs(self.facility_index_secs)
    }

    pub fn geocoding(&self) -> Duration {
        Duration::from_secs(self.geocoding_secs)
    }

    pub fn environment(&self) -> Duration {
        Duration::from_secs(self.environment_secs)
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub matching: MatchingConfig,
    pub timeouts: TimeoutConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matching: MatchingConfig::default(),
            timeouts: TimeoutConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self {
            matching: file.matching,
            timeouts: file.timeouts,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents, path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str, path: &Path) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
