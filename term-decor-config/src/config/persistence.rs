//! Config persistence and path resolution methods for `Config`.
//!
//! Covers:
//! - `load` / `load_from` (YAML file I/O, validation)
//! - `save` / `save_to` (atomic write)
//! - XDG-compliant path helpers (`config_path`, `config_dir`)

use super::Config;
use crate::error::ConfigError;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from the default path, creating it when missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save() {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            log::info!("Default config created successfully");
            Ok(config)
        }
    }

    /// Load and validate configuration from `path`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] (wrapped in `anyhow`) when the file cannot be
    /// read, is not valid YAML, or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;
        let config = Self::from_yaml(&contents)?;
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes as YAML null; treat it as "all defaults".
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::from)?;
        }

        let yaml = self.to_yaml()?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, path).map_err(ConfigError::from)?;

        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("term-decor")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // Use XDG convention on all platforms: ~/.config/term-decor/
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("term-decor")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
