//! Application configuration.

use crate::error::{AppError, AppResult};
use ergmeter_core::PollInterval;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One logbook account to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Registry key; also names the account's state file.
    pub name: String,
    /// Logbook login name.
    pub username: String,
    /// Logbook password.
    pub password: String,
    /// Poll interval in minutes. Values outside 5..=1440 are rejected while
    /// the configuration loads, never at poll time.
    #[serde(default)]
    pub update_interval_min: Option<PollInterval>,
}

impl AccountConfig {
    /// Effective poll interval (configured or the 30-minute default).
    #[must_use]
    pub fn poll_interval(&self) -> PollInterval {
        self.update_interval_min.unwrap_or_default()
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one state file per account.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Logbook origin. Overridable for local testing.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Accounts to poll.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

fn default_state_dir() -> String {
    "./data/state".to_string()
}

fn default_base_url() -> String {
    ergmeter_client::DEFAULT_BASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            base_url: default_base_url(),
            accounts: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("ERGMETER_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check account entries beyond what deserialization already enforces.
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for account in &self.accounts {
            if account.name.trim().is_empty() {
                return Err(AppError::Config("account name must not be empty".into()));
            }
            if !seen.insert(account.name.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate account name: {}",
                    account.name
                )));
            }
            if account.username.is_empty() || account.password.is_empty() {
                return Err(AppError::Config(format!(
                    "account {}: username and password are required",
                    account.name
                )));
            }
        }
        Ok(())
    }
}
