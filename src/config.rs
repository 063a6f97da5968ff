//! Configuration loading and management
//!
//! Handles parsing of `.dtt.toml` configuration files. Mail credentials are
//! never read from the file; see [`crate::notify::ReminderSettings`].

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = ".dtt.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data file configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Static user list
    #[serde(default)]
    pub users: UsersConfig,

    /// Reminder schedule and relay
    #[serde(default)]
    pub reminder: ReminderConfig,
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// CSV path, relative to the project directory
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "tasks.csv".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// The fixed list of named users the selector offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersConfig {
    #[serde(default = "default_user_names")]
    pub names: Vec<String>,

    /// User selected when none is given; falls back to the first name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

fn default_user_names() -> Vec<String> {
    vec!["Alice".to_string(), "Bob".to_string()]
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            names: default_user_names(),
            default: None,
        }
    }
}

/// Reminder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Local time of day, `HH:MM`
    #[serde(default = "default_reminder_at")]
    pub at: String,

    /// Scheduler polling interval in seconds
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Link placed in the reminder body
    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,
}

fn default_reminder_at() -> String {
    "09:00".to_string()
}

fn default_poll_secs() -> u64 {
    60
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_dashboard_url() -> String {
    "http://localhost:8501".to_string()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            at: default_reminder_at(),
            poll_secs: default_poll_secs(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            dashboard_url: default_dashboard_url(),
        }
    }
}

impl ReminderConfig {
    /// Parsed time of day for the daily job
    pub fn time_of_day(&self) -> Result<NaiveTime> {
        parse_time_of_day(&self.at)
            .map_err(|msg| Error::InvalidConfig(format!("reminder.at: {msg}")))
    }

    fn validate(&self) -> Result<()> {
        self.time_of_day()?;
        if self.poll_secs == 0 {
            return Err(Error::InvalidConfig(
                "reminder.poll_secs must be > 0".to_string(),
            ));
        }
        if self.smtp_host.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "reminder.smtp_host cannot be empty".to_string(),
            ));
        }
        if self.smtp_port == 0 {
            return Err(Error::InvalidConfig(
                "reminder.smtp_port must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse `HH:MM` (or `HH:MM:SS`) into a time of day.
pub fn parse_time_of_day(raw: &str) -> std::result::Result<NaiveTime, String> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|err| format!("invalid time '{trimmed}' (expected HH:MM): {err}"))
}

impl UsersConfig {
    /// The user selected when nothing else is given
    pub fn default_user(&self) -> Option<&str> {
        self.default
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| self.names.first().map(|name| name.trim()))
    }

    /// Exact, trimmed membership check
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.names.iter().any(|entry| entry.trim() == name)
    }

    fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(Error::InvalidConfig(
                "users.names cannot be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.names {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidConfig(
                    "users.names cannot include empty entries".to_string(),
                ));
            }
            if !seen.insert(trimmed.to_string()) {
                return Err(Error::InvalidConfig(format!(
                    "users.names has duplicate entry '{trimmed}'"
                )));
            }
        }

        if let Some(default) = self.default.as_deref() {
            if !seen.contains(default.trim()) {
                return Err(Error::InvalidConfig(format!(
                    "users.default '{default}' not in users.names"
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a `.dtt.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the project directory, or return defaults when
    /// no file exists. A file that exists but does not parse is an error.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data file path resolved against the project directory
    pub fn store_path(&self, dir: &Path) -> PathBuf {
        let path = Path::new(self.store.path.trim());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.store.path.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "store.path cannot be empty".to_string(),
            ));
        }
        self.users.validate()?;
        self.reminder.validate()?;
        Ok(())
    }
}
