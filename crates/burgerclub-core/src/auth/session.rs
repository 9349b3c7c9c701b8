use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const SESSION_FILE: &str = "admin_session.json";

/// Minutes an unlocked admin session stays valid.
const SESSION_EXPIRY_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Hash that was current at login; a password change invalidates it
    pub admin_hash: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(admin_hash: String) -> Self {
        Self {
            admin_hash,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.created_at + Duration::minutes(SESSION_EXPIRY_MINUTES)
    }

    pub fn minutes_until_expiry(&self) -> i64 {
        let expiry = self.created_at + Duration::minutes(SESSION_EXPIRY_MINUTES);
        (expiry - Utc::now()).num_minutes().max(0)
    }
}

pub struct AdminSession {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl AdminSession {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load an unexpired session from disk. Returns whether one was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn start(&mut self, admin_hash: String) -> Result<()> {
        self.data = Some(SessionData::new(admin_hash));
        self.save()
    }

    /// Valid when present, unexpired and issued under `current_hash`.
    pub fn is_valid_for(&self, current_hash: &str) -> bool {
        self.data
            .as_ref()
            .map(|d| !d.is_expired() && d.admin_hash.eq_ignore_ascii_case(current_hash))
            .unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
