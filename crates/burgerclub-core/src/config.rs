//! Application configuration management.
//!
//! Configuration is stored at `~/.config/burgerclub/config.json`. The store
//! URL and API key can be overridden with `BURGERCLUB_URL` and
//! `BURGERCLUB_API_KEY` (a `.env` file is honoured by the binary).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, DEFAULT_ADMIN_HASH};
use crate::roster::HistoricalCounts;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "burgerclub";

const CONFIG_FILE: &str = "config.json";

pub const URL_ENV: &str = "BURGERCLUB_URL";
pub const API_KEY_ENV: &str = "BURGERCLUB_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub store_url: Option<String>,
    /// Public (anon) API key. Prefer the keychain or the environment.
    pub api_key: Option<String>,
    /// Admin digest used when `form_config.admin_hash` is unavailable
    pub admin_password_hash: String,
    pub map_center: (f64, f64),
    pub map_zoom: u8,
    pub geocoder_country_codes: String,
    /// Submission counts per item id from before attendance was recorded
    pub historical_counts: HistoricalCounts,
    /// Directory for daily log files; stderr only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            api_key: None,
            admin_password_hash: DEFAULT_ADMIN_HASH.to_string(),
            map_center: (40.7128, -74.0060),
            map_zoom: 12,
            geocoder_country_codes: "us".to_string(),
            historical_counts: HistoricalCounts::new(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent), then apply env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.store_url = Some(url);
        }
        if let Some(key) = var(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn store_url(&self) -> Result<&str> {
        self.store_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Store URL is not configured. Set {} or run `burgerclub config --url <URL>`",
                    URL_ENV
                )
            })
    }

    /// API key from the environment/config file, else the OS keychain.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        CredentialStore::get_api_key().with_context(|| {
            format!(
                "No API key configured. Set {} or run `burgerclub config --api-key <KEY>`",
                API_KEY_ENV
            )
        })
    }
}
