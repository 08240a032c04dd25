//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the site's base URL, an optional cache TTL override, and an optional
//! cache directory.
//!
//! Configuration is stored at `~/.config/propdesk/config.json`. The
//! `PROPDESK_BASE_URL` and `PROPDESK_CACHE_DIR` environment variables take
//! precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::StoreConfig;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "propdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const BASE_URL_ENV: &str = "PROPDESK_BASE_URL";
pub const CACHE_DIR_ENV: &str = "PROPDESK_CACHE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(CACHE_DIR_ENV).ok(),
        ))
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

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Replace fields with non-blank override values
    pub fn with_overrides(mut self, base_url: Option<String>, cache_dir: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = Some(url.trim().to_string());
        }
        if let Some(dir) = cache_dir.filter(|d| !d.trim().is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir.trim()));
        }
        self
    }

    pub fn base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No site URL configured. Set {} or add \"base_url\" to {}",
                BASE_URL_ENV,
                CONFIG_FILE
            )
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        match self.cache_ttl_secs {
            Some(secs) => StoreConfig {
                ttl: Duration::from_secs(secs),
            },
            None => StoreConfig::default(),
        }
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
