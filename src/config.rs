use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Cadence shared by the health and analytics pollers unless overridden.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Main configuration structure, built once at start-up and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    /// Upper bound for a prompt submission. Zero disables it.
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    fn default_timeout_secs() -> u64 {
        120
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub health_interval_secs: u64,
    pub analytics_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            health_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            analytics_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

impl PollingConfig {
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    pub fn analytics_interval(&self) -> Duration {
        Duration::from_secs(self.analytics_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                token: String::new(),
                request_timeout_secs: ApiConfig::default_timeout_secs(),
            },
            polling: PollingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    ///
    /// A missing or unreadable file falls back to defaults; an invalid result
    /// (most importantly a missing bearer token) is a hard error.
    pub fn load() -> Result<Self> {
        for path in [".env", "../.env"] {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                break;
            }
        }

        let config_path =
            env::var("ANSWER_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::from_yaml(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::warn!("{} in {} - using defaults", e, config_path);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::info!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ANSWER_API_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("ANSWER_API_TOKEN") {
            self.api.token = token;
        }
        if let Some(secs) = lookup("ANSWER_REQUEST_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.api.request_timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid ANSWER_REQUEST_TIMEOUT_SECS: {}", secs),
            }
        }
        if let Some(secs) = lookup("ANSWER_HEALTH_INTERVAL_SECS") {
            match secs.parse() {
                Ok(secs) => self.polling.health_interval_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid ANSWER_HEALTH_INTERVAL_SECS: {}", secs),
            }
        }
        if let Some(secs) = lookup("ANSWER_ANALYTICS_INTERVAL_SECS") {
            match secs.parse() {
                Ok(secs) => self.polling.analytics_interval_secs = secs,
                Err(_) => {
                    tracing::warn!("Ignoring invalid ANSWER_ANALYTICS_INTERVAL_SECS: {}", secs)
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.token.trim().is_empty() {
            return Err(ClientError::Config(
                "ANSWER_API_TOKEN must be set to the service's bearer token".into(),
            ));
        }

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "api.base_url must be an http(s) URL, got '{url}'"
            )));
        }

        if self.polling.health_interval_secs == 0 || self.polling.analytics_interval_secs == 0 {
            return Err(ClientError::Config("Poll intervals cannot be 0".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_use_shared_poll_interval() {
        let cfg = Config::default();
        assert_eq!(cfg.polling.health_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(cfg.polling.analytics_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(cfg.api.request_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_missing_token_is_a_config_error() {
        let cfg = Config::default();
        assert!(matches!(cfg.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[
            ("ANSWER_API_URL", "https://answers.example.com/api"),
            ("ANSWER_API_TOKEN", "secret"),
            ("ANSWER_REQUEST_TIMEOUT_SECS", "0"),
            ("ANSWER_HEALTH_INTERVAL_SECS", "10"),
        ]));

        assert_eq!(cfg.api.base_url, "https://answers.example.com/api");
        assert_eq!(cfg.api.token, "secret");
        assert_eq!(cfg.api.request_timeout(), None);
        assert_eq!(cfg.polling.health_interval(), Duration::from_secs(10));
        assert_eq!(cfg.polling.analytics_interval(), DEFAULT_POLL_INTERVAL);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[("ANSWER_ANALYTICS_INTERVAL_SECS", "soon")]));
        assert_eq!(cfg.polling.analytics_interval(), DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_yaml_without_polling_section() {
        let cfg = Config::from_yaml(
            "api:\n  base_url: http://127.0.0.1:9000\n  token: abc\n",
        )
        .expect("yaml should parse");
        assert_eq!(cfg.api.request_timeout_secs, 120);
        assert_eq!(cfg.polling.health_interval_secs, 30);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut cfg = Config::default();
        cfg.api.token = "abc".into();
        cfg.polling.analytics_interval_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
