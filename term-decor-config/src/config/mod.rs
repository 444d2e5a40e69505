//! Decoration manager configuration.
//!
//! # Sub-modules
//!
//! - [`persistence`]: `impl Config` methods for load/save/path-resolution

pub mod persistence;

use crate::defaults;
use crate::error::ConfigError;
use crate::types::{InspectedSetting, LogLevel, PlaceholderStrategy, SettingKey, SettingValue};
use serde::{Deserialize, Serialize};

/// Settings consumed by the command decoration manager.
///
/// Every field carries a serde default so partial YAML files (and partial
/// patches applied at runtime) deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Font & line metrics
    // ========================================================================
    /// Terminal font size in points
    #[serde(default = "defaults::font_size")]
    pub font_size: f32,

    /// Line height multiplier
    #[serde(default = "defaults::line_height")]
    pub line_height: f32,

    // ========================================================================
    // Shell integration decorations
    // ========================================================================
    /// Show gutter decorations next to commands detected by shell integration
    #[serde(default = "defaults::decorations_enabled")]
    pub decorations_enabled: bool,

    /// Icon (codicon name) for commands with unknown exit status
    #[serde(default = "defaults::decoration_icon")]
    pub decoration_icon: String,

    /// Icon for commands that exited with code 0
    #[serde(default = "defaults::decoration_icon_success")]
    pub decoration_icon_success: String,

    /// Icon for commands that exited with a nonzero code
    #[serde(default = "defaults::decoration_icon_error")]
    pub decoration_icon_error: String,

    /// Placeholder handling when a new command starts before the previous
    /// one finished
    #[serde(default = "defaults::placeholder_strategy")]
    pub placeholder_strategy: PlaceholderStrategy,

    // ========================================================================
    // Hover & logging
    // ========================================================================
    /// Delay before a decoration hover is shown, in milliseconds
    #[serde(default = "defaults::hover_delay_ms")]
    pub hover_delay_ms: u64,

    /// Verbosity of the debug log file
    #[serde(default = "defaults::log_level")]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_size: defaults::font_size(),
            line_height: defaults::line_height(),
            decorations_enabled: defaults::decorations_enabled(),
            decoration_icon: defaults::decoration_icon(),
            decoration_icon_success: defaults::decoration_icon_success(),
            decoration_icon_error: defaults::decoration_icon_error(),
            placeholder_strategy: defaults::placeholder_strategy(),
            hover_delay_ms: defaults::hover_delay_ms(),
            log_level: defaults::log_level(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Enable or disable command decorations
    pub fn with_decorations_enabled(mut self, enabled: bool) -> Self {
        self.decorations_enabled = enabled;
        self
    }

    /// Set the hover delay in milliseconds
    pub fn with_hover_delay_ms(mut self, delay_ms: u64) -> Self {
        self.hover_delay_ms = delay_ms;
        self
    }

    /// Set the placeholder strategy
    pub fn with_placeholder_strategy(mut self, strategy: PlaceholderStrategy) -> Self {
        self.placeholder_strategy = strategy;
        self
    }

    /// Current value of `key`.
    pub fn value(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::FontSize => self.font_size.into(),
            SettingKey::LineHeight => self.line_height.into(),
            SettingKey::DecorationsEnabled => self.decorations_enabled.into(),
            SettingKey::DecorationIcon => self.decoration_icon.as_str().into(),
            SettingKey::DecorationIconSuccess => self.decoration_icon_success.as_str().into(),
            SettingKey::DecorationIconError => self.decoration_icon_error.as_str().into(),
            SettingKey::HoverDelay => self.hover_delay_ms.into(),
            SettingKey::PlaceholderStrategy => self.placeholder_strategy.into(),
            SettingKey::LogLevel => self.log_level.into(),
        }
    }

    /// Effective value of `key` alongside the built-in default.
    pub fn inspect(&self, key: SettingKey) -> InspectedSetting {
        InspectedSetting {
            value: self.value(key),
            default_value: Config::default().value(key),
        }
    }

    /// Keys whose values differ between `self` and `other`.
    pub fn changed_keys(&self, other: &Config) -> Vec<SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(|key| self.value(*key) != other.value(*key))
            .collect()
    }

    /// Check field values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "font_size must be a positive number, got {}",
                self.font_size
            )));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "line_height must be a positive number, got {}",
                self.line_height
            )));
        }
        for (field, icon) in [
            ("decoration_icon", &self.decoration_icon),
            ("decoration_icon_success", &self.decoration_icon_success),
            ("decoration_icon_error", &self.decoration_icon_error),
        ] {
            if icon.trim().is_empty() || icon.contains(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "{field} must be a single icon name, got {icon:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.font_size, 14.0);
        assert_eq!(config.line_height, 1.0);
        assert!(config.decorations_enabled);
        assert_eq!(config.decoration_icon, "circle-outline");
        assert_eq!(config.decoration_icon_success, "primitive-dot");
        assert_eq!(config.decoration_icon_error, "error-small");
        assert_eq!(config.hover_delay_ms, 500);
        assert_eq!(config.placeholder_strategy, PlaceholderStrategy::Retain);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml_ng::from_str("font_size: 20.0\n").unwrap();
        assert_eq!(config.font_size, 20.0);
        assert_eq!(config.hover_delay_ms, 500);
        assert!(config.decorations_enabled);
    }

    #[test]
    fn test_placeholder_strategy_yaml() {
        let config: Config =
            serde_yaml_ng::from_str("placeholder_strategy: dispose_previous\n").unwrap();
        assert_eq!(
            config.placeholder_strategy,
            PlaceholderStrategy::DisposePrevious
        );
    }

    #[test]
    fn test_inspect_reports_default() {
        let config = Config::new().with_font_size(28.0);
        let inspected = config.inspect(SettingKey::FontSize);
        assert_eq!(inspected.value.as_f64(), Some(28.0));
        assert_eq!(inspected.default_value.as_f64(), Some(14.0));
    }

    #[test]
    fn test_changed_keys() {
        let old = Config::default();
        let mut new = old.clone().with_font_size(10.0);
        new.decoration_icon_error = "x".to_string();
        assert_eq!(
            old.changed_keys(&new),
            vec![SettingKey::FontSize, SettingKey::DecorationIconError]
        );
        assert!(old.changed_keys(&old.clone()).is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::new().with_font_size(0.0).validate().is_err());
        assert!(Config::new().with_font_size(f32::NAN).validate().is_err());

        let mut config = Config::default();
        config.decoration_icon = "two words".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }
}
