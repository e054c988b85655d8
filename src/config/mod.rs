//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/clinic-locator/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search box behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// External provider endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Clinic submission settings
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Device location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search box behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet window before a query is looked up
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of places per lookup
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

/// External provider endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Nominatim base URL (search + reverse geocoding)
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// IP geolocation URL (current location)
    #[serde(default = "default_ip_api_url")]
    pub ip_api_url: String,

    /// User-Agent sent with provider requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Clinic submission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Registration endpoint receiving the address payload
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// Device location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// If false, current-location requests are treated as denied
    #[serde(default = "default_allow_current_location")]
    pub allow_current_location: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions for serde
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}
fn default_nominatim_url() -> String {
    DEFAULT_NOMINATIM_URL.to_string()
}
fn default_ip_api_url() -> String {
    DEFAULT_IP_API_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_allow_current_location() -> bool {
    DEFAULT_ALLOW_CURRENT_LOCATION
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            limit: default_search_limit(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            ip_api_url: default_ip_api_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            allow_current_location: default_allow_current_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["search", "debounce_ms"] => Some(self.search.debounce_ms.to_string()),
            ["search", "limit"] => Some(self.search.limit.to_string()),

            ["providers", "nominatim_url"] => Some(self.providers.nominatim_url.clone()),
            ["providers", "ip_api_url"] => Some(self.providers.ip_api_url.clone()),
            ["providers", "user_agent"] => Some(self.providers.user_agent.clone()),

            ["submission", "endpoint"] => Some(self.submission.endpoint.clone()),

            ["location", "allow_current_location"] => {
                Some(self.location.allow_current_location.to_string())
            }

            ["logging", "level"] => Some(self.logging.level.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["search", "debounce_ms"] => {
                self.search.debounce_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid debounce value: {}", value))
                })?;
            }
            ["search", "limit"] => {
                let limit: usize = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid limit value: {}", value))
                })?;
                if limit == 0 {
                    return Err(Error::Config("Search limit must be at least 1".to_string()));
                }
                self.search.limit = limit;
            }

            ["providers", "nominatim_url"] => {
                self.providers.nominatim_url = value.trim_end_matches('/').to_string();
            }
            ["providers", "ip_api_url"] => {
                self.providers.ip_api_url = value.to_string();
            }
            ["providers", "user_agent"] => {
                self.providers.user_agent = value.to_string();
            }

            ["submission", "endpoint"] => {
                self.submission.endpoint = value.to_string();
            }

            ["location", "allow_current_location"] => {
                self.location.allow_current_location = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }

            ["logging", "level"] => {
                self.logging.level = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "search.debounce_ms",
            "search.limit",
            "providers.nominatim_url",
            "providers.ip_api_url",
            "providers.user_agent",
            "submission.endpoint",
            "location.allow_current_location",
            "logging.level",
        ]
    }

    /// Debounce window as a Duration
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.limit, 10);
        assert!(config.location.allow_current_location);
        assert!(config.submission.endpoint.ends_with("/HealthProviders/CreateHealthProvider"));
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("search.debounce_ms"), Some("500".to_string()));

        config.set("search.debounce_ms", "250").unwrap();
        assert_eq!(config.get("search.debounce_ms"), Some("250".to_string()));
        assert_eq!(config.debounce_window(), Duration::from_millis(250));

        config.set("location.allow_current_location", "false").unwrap();
        assert!(!config.location.allow_current_location);
    }

    #[test]
    fn test_set_strips_trailing_slash_from_nominatim_url() {
        let mut config = Config::default();
        config.set("providers.nominatim_url", "http://localhost:8080/").unwrap();
        assert_eq!(config.providers.nominatim_url, "http://localhost:8080");
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("search.debounce_ms", "soon").is_err());
        assert!(config.set("search.limit", "0").is_err());
        assert!(config.set("location.allow_current_location", "maybe").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.submission.endpoint = "http://127.0.0.1:9/clinics".to_string();
        config.search.limit = 3;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.submission.endpoint, "http://127.0.0.1:9/clinics");
        assert_eq!(loaded.search.limit, 3);
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.search.debounce_ms, 500);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[search]\nlimit = 4\n").unwrap();
        assert_eq!(loaded.search.limit, 4);
        assert_eq!(loaded.search.debounce_ms, 500);
        assert_eq!(loaded.logging.level, "warn");
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[search]"));
        assert!(toml.contains("[providers]"));
        assert!(toml.contains("[submission]"));
        assert!(toml.contains("[location]"));
    }

    #[test]
    fn test_available_keys_resolve() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "key {} has no value", key);
        }
    }
}
