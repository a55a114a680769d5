//! Configuration management for Ideaflow.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Autosave settings
    pub autosave: AutosaveConfig,

    /// AI generation settings
    #[cfg(feature = "ai")]
    pub ai: AiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding session state (defaults to `~/.ideaflow`).
    pub session_dir: Option<PathBuf>,

    /// Default step when neither a deep link nor stored state provides one.
    pub default_step: Option<usize>,
}

/// Background autosave settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Whether the autosave ticker runs at all.
    pub enabled: bool,

    /// Seconds between autosave flushes.
    pub interval_secs: u64,
}

/// AI generation settings.
#[cfg(feature = "ai")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of the idea-generation service, if any.
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            autosave: AutosaveConfig::default(),
            #[cfg(feature = "ai")]
            ai: AiConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { session_dir: None, default_step: None }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { enabled: true, interval_secs: 30 }
    }
}

#[cfg(feature = "ai")]
impl Default for AiConfig {
    fn default() -> Self {
        Self { endpoint: None, timeout_secs: 30 }
    }
}

impl Config {
    /// Default config file path (`~/.ideaflow/config.toml`).
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".ideaflow").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults when absent.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path, or defaults when absent.
    pub fn load_from(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the session directory, falling back to `~/.ideaflow`.
    pub fn session_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.general.session_dir {
            return Ok(dir.clone());
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".ideaflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.interval_secs, 30);
        assert!(config.general.session_dir.is_none());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.autosave.interval_secs, 30);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.autosave.interval_secs = 10;
        config.general.default_step = Some(2);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.autosave.interval_secs, 10);
        assert_eq!(loaded.general.default_step, Some(2));
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str("[autosave]\ninterval_secs = 5\n").unwrap();
        assert_eq!(config.autosave.interval_secs, 5);
        assert!(config.autosave.enabled);
    }
}
