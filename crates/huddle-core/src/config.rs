//! Huddle configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HuddleError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuddleConfig {
    /// Minutes east of UTC for the deployment's wall clock. One zone per
    /// deployment; 480 = UTC+8.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Where the schedule database lives.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Project label applied when a schedule names none.
    #[serde(default = "default_project")]
    pub default_project: String,
}

fn default_utc_offset() -> i32 {
    480
}
fn default_store_path() -> PathBuf {
    HuddleConfig::home_dir().join("schedules.db")
}
fn default_project() -> String {
    "General".into()
}

impl Default for HuddleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset(),
            store_path: default_store_path(),
            default_project: default_project(),
        }
    }
}

impl HuddleConfig {
    /// Load config from the default path (~/.huddle/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HuddleError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| HuddleError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| HuddleError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".huddle")
            .join("config.toml")
    }

    /// Get the Huddle home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".huddle")
    }

    /// Current wall-clock date and time in the deployment's zone.
    pub fn local_now(&self) -> chrono::NaiveDateTime {
        (chrono::Utc::now() + chrono::Duration::minutes(self.utc_offset_minutes as i64)).naive_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: HuddleConfig = toml::from_str("").unwrap();
        assert_eq!(config.utc_offset_minutes, 480);
        assert_eq!(config.default_project, "General");
    }

    #[test]
    fn partial_config_parses() {
        let config: HuddleConfig = toml::from_str("utc_offset_minutes = -300").unwrap();
        assert_eq!(config.utc_offset_minutes, -300);
        assert_eq!(config.default_project, "General");
    }
}
