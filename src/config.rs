//! Client configuration.
//!
//! Layered in this order, later layers winning:
//! 1. Built-in defaults
//! 2. `<config_dir>/pricetable/config.json`
//! 3. Environment variables:
//!    - `PRICETABLE_URL` - API base URL
//!    - `PRICETABLE_API_KEY` - bearer token (optional)
//!    - `PRICETABLE_TIMEOUT_SECS` - request timeout in seconds (must be positive)
//!
//! Command-line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::Deserialize;

use crate::view::SortBy;

const APP_NAME: &str = "pricetable";
const CONFIG_FILE: &str = "config.json";

/// Default items API.
pub const DEFAULT_URL: &str = "https://finvest-server.vercel.app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const URL_VAR: &str = "PRICETABLE_URL";
pub const API_KEY_VAR: &str = "PRICETABLE_API_KEY";
pub const TIMEOUT_VAR: &str = "PRICETABLE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the items API, without the `/api/items` path
    pub api_url: String,
    /// Bearer token sent with every request
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sort applied when the table is first shown
    pub default_sort: SortBy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_sort: SortBy::default(),
        }
    }
}

impl Config {
    /// Load the file layer and the environment layer.
    /// A missing or broken config file falls back to defaults.
    pub fn load() -> Self {
        let base = match get_config_path().and_then(|path| Self::from_file(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Read a config file. A file that does not exist yields defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Self =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        if config.timeout_secs == 0 {
            tracing::warn!("Ignoring timeout_secs = 0 in {}", path.display());
            config.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }

        Ok(config)
    }

    /// Apply environment overrides looked up through `var`.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var(URL_VAR) {
            self.api_url = url;
        }
        if let Some(key) = var(API_KEY_VAR).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(raw) = var(TIMEOUT_VAR) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => tracing::warn!("Ignoring invalid {}: {:?}", TIMEOUT_VAR, raw),
            }
        }
        self
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Column;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_hosted_api() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_sort, SortBy::ascending(Column::Price));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "api_url": "http://localhost:3000", "default_sort": { "column": "name", "descending": true } }"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_sort, SortBy::descending(Column::Name));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = Config::default().with_env(env(&[
            (URL_VAR, "http://override.test"),
            (API_KEY_VAR, "token"),
            (TIMEOUT_VAR, "7"),
        ]));
        assert_eq!(config.api_url, "http://override.test");
        assert_eq!(config.api_key.as_deref(), Some("token"));
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn invalid_timeout_and_empty_key_are_ignored() {
        let config = Config::default().with_env(env(&[(TIMEOUT_VAR, "soon"), (API_KEY_VAR, "")]));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn zero_timeout_is_ignored() {
        let config = Config::default().with_env(env(&[(TIMEOUT_VAR, "0")]));
        assert_eq!(config.timeout_secs, 30);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "timeout_secs": 0 }"#).unwrap();
        assert_eq!(Config::from_file(&path).unwrap().timeout_secs, 30);
    }
}
