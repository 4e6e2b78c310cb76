use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: &str = "4204";
const DATA_DIR_NAME: &str = "biji-server";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub registration_max_attempts: u32,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = value_or_default(&lookup, "PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid("PORT must be an integer in [1, 65535]".to_string()))?;
        if port == 0 {
            return Err(ConfigError::Invalid(
                "PORT must be in [1, 65535]".to_string(),
            ));
        }

        let bind_addr = value_or_default(&lookup, "BIJI_API_BIND_ADDR", &format!("127.0.0.1:{port}"));

        let data_dir = optional_trimmed(&lookup, "DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(DATA_DIR_NAME)))
            .ok_or(ConfigError::MissingVar("DATA_DIR"))?;

        let registration_max_attempts =
            value_or_default(&lookup, "REGISTRATION_MAX_ATTEMPTS", "10")
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::Invalid(
                        "REGISTRATION_MAX_ATTEMPTS must be an integer in [1, 100]".to_string(),
                    )
                })?;
        if !(1..=100).contains(&registration_max_attempts) {
            return Err(ConfigError::Invalid(
                "REGISTRATION_MAX_ATTEMPTS must be in [1, 100]".to_string(),
            ));
        }

        let request_timeout_secs = value_or_default(&lookup, "REQUEST_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "REQUEST_TIMEOUT_SECS must be an integer in [1, 300]".to_string(),
                )
            })?;
        if !(1..=300).contains(&request_timeout_secs) {
            return Err(ConfigError::Invalid(
                "REQUEST_TIMEOUT_SECS must be in [1, 300]".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            data_dir,
            registration_max_attempts,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn config_uses_defaults() {
        let config = config_from(&[("DATA_DIR", "/var/lib/biji")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4204");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/biji"));
        assert_eq!(config.registration_max_attempts, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn config_port_feeds_bind_addr() {
        let config = config_from(&[("DATA_DIR", "/tmp/b"), ("PORT", "9000")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");

        let config = config_from(&[
            ("DATA_DIR", "/tmp/b"),
            ("PORT", "9000"),
            ("BIJI_API_BIND_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn config_rejects_invalid_values() {
        for (key, value) in [
            ("PORT", "420420"),
            ("PORT", "0"),
            ("REGISTRATION_MAX_ATTEMPTS", "0"),
            ("REGISTRATION_MAX_ATTEMPTS", "many"),
            ("REQUEST_TIMEOUT_SECS", "301"),
        ] {
            let err = config_from(&[("DATA_DIR", "/tmp/b"), (key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}: {err}");
        }
    }

    #[test]
    fn config_defaults_data_dir_under_home() {
        if let Some(home) = dirs::home_dir() {
            let config = config_from(&[]).unwrap();
            assert_eq!(config.data_dir, home.join(DATA_DIR_NAME));
        }
    }
}
