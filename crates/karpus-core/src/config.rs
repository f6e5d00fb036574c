//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! where data lives, the attendance cache TTL, the typing-indicator window
//! and logging options.
//!
//! Configuration is stored at `~/.config/karpus-kids/config.json`.
//! `KARPUS_DATA_DIR` and `KARPUS_CACHE_TTL_MS` override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL_MS;
use crate::store::DEFAULT_TYPING_WINDOW_MS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "karpus-kids";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_DATA_DIR: &str = "KARPUS_DATA_DIR";
const ENV_CACHE_TTL_MS: &str = "KARPUS_CACHE_TTL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub cache_ttl_ms: u64,
    pub typing_window_ms: u64,
    pub log_to_file: bool,
    /// Contact id the CLI reads chat threads as
    pub default_user: Option<String>,
}

/// An environment override whose value could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    pub name: &'static str,
    pub value: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_ttl_ms: DEFAULT_TTL_MS,
            typing_window_ms: DEFAULT_TYPING_WINDOW_MS,
            log_to_file: false,
            default_user: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults if missing), then apply env overrides.
    ///
    /// Overrides that fail to parse are returned so the caller can report
    /// them once logging is up.
    pub fn load() -> Result<(Self, Vec<RejectedOverride>)> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        let rejected = config.apply_overrides(|name| std::env::var(name).ok());
        Ok((config, rejected))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the environment in practice).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Vec<RejectedOverride> {
        let mut rejected = Vec::new();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_MS) {
            match raw.trim().parse() {
                Ok(ttl) => self.cache_ttl_ms = ttl,
                Err(_) => rejected.push(RejectedOverride {
                    name: ENV_CACHE_TTL_MS,
                    value: raw,
                }),
            }
        }
        rejected
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the storage file and logs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl_ms, 300_000);
        assert_eq!(config.typing_window_ms, 3000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            cache_ttl_ms: 60_000,
            default_user: Some("direccion".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_to_file": true}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.log_to_file);
        assert_eq!(config.cache_ttl_ms, DEFAULT_TTL_MS);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let rejected = config.apply_overrides(|name| match name {
            "KARPUS_DATA_DIR" => Some("/tmp/karpus".to_string()),
            "KARPUS_CACHE_TTL_MS" => Some("1000".to_string()),
            _ => None,
        });
        assert!(rejected.is_empty());
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/karpus")));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/karpus"));
        assert_eq!(config.cache_ttl_ms, 1000);
    }

    #[test]
    fn test_invalid_ttl_override_ignored() {
        let mut config = Config::default();
        let rejected = config
            .apply_overrides(|name| (name == "KARPUS_CACHE_TTL_MS").then(|| "soon".to_string()));
        assert_eq!(config.cache_ttl_ms, DEFAULT_TTL_MS);
        assert_eq!(
            rejected,
            vec![RejectedOverride {
                name: "KARPUS_CACHE_TTL_MS",
                value: "soon".to_string(),
            }]
        );
    }
}
