//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the API base URL, the token file location and the request
//! timeout. Every value is optional; `BADGR_API_URL` and `BADGR_TOKEN_FILE`
//! override the file.
//!
//! Configuration is stored at `~/.config/badgr-lite/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::{DEFAULT_API_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::api::{BadgrError, Result};

/// Application name used for the config directory path
const APP_NAME: &str = "badgr-lite";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file used when nothing else is configured
pub const DEFAULT_TOKEN_FILE: &str = "./token.json";

pub const ENV_API_URL: &str = "BADGR_API_URL";
pub const ENV_TOKEN_FILE: &str = "BADGR_TOKEN_FILE";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub token_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load the user config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| BadgrError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BadgrError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = Some(url);
        }
        if let Some(file) = var(ENV_TOKEN_FILE).filter(|v| !v.is_empty()) {
            self.token_file = Some(PathBuf::from(file));
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn token_file(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url(), "https://api.badgr.io");
        assert_eq!(config.token_file(), PathBuf::from("./token.json"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: Some("https://badgr.example.org".into()),
            token_file: Some(PathBuf::from("/etc/badgr/token.json")),
            request_timeout_secs: Some(5),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            api_base_url: Some("https://from-file".into()),
            token_file: None,
            request_timeout_secs: None,
        };
        config.apply_env(|key| match key {
            ENV_TOKEN_FILE => Some("/tmp/token.json".to_string()),
            ENV_API_URL => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api_base_url(), "https://from-file");
        assert_eq!(config.token_file(), PathBuf::from("/tmp/token.json"));
    }
}
