//! Persistent relay settings for this device.

use std::path::{Path, PathBuf};

use biji_core::store::{read_json, write_json_atomic, Layout};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const SETTINGS_FILE_NAME: &str = "sync.json";
const SERVER_URL_ENV: &str = "BIJI_SERVER_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub sync_code: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Settings live next to the note document they sync
pub fn settings_path_for(data_file: &Path) -> PathBuf {
    data_file.with_file_name(SETTINGS_FILE_NAME)
}

pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("https://") || value.starts_with("http://")
}

impl SyncSettings {
    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let mut settings: Self = read_json(path).map_err(|error| {
            CliError::Config(format!(
                "Failed to read sync settings at {}: {error}",
                path.display()
            ))
        })?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        write_json_atomic(path, &normalized, Layout::Pretty)?;
        Ok(())
    }

    /// Relay URL from `BIJI_SERVER_URL`, falling back to the saved one
    pub fn resolve_server_url(&self) -> Result<String, CliError> {
        self.resolve_server_url_with(std::env::var(SERVER_URL_ENV).ok())
    }

    fn resolve_server_url_with(&self, env_value: Option<String>) -> Result<String, CliError> {
        let url = normalize_text_option(env_value)
            .or_else(|| self.server_url.clone())
            .ok_or(CliError::SyncNotConfigured)?;
        if !is_http_url(&url) {
            return Err(CliError::Config(format!(
                "server URL must start with http:// or https://: {url}"
            )));
        }
        Ok(url)
    }

    pub fn require_code(&self) -> Result<&str, CliError> {
        self.sync_code.as_deref().ok_or(CliError::SyncNotConfigured)
    }

    fn normalize(&mut self) {
        self.server_url = normalize_text_option(self.server_url.take());
        self.sync_code = normalize_text_option(self.sync_code.take()).map(|code| code.to_uppercase());
    }
}
