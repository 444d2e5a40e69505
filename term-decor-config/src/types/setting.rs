//! Setting keys and dynamically typed setting values.
//!
//! Change notifications and `inspect` lookups address settings by
//! [`SettingKey`] rather than by struct field, so that listeners can filter
//! on the keys they care about.

use super::{LogLevel, PlaceholderStrategy};
use std::fmt;

/// Identifies one configurable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    FontSize,
    LineHeight,
    DecorationsEnabled,
    DecorationIcon,
    DecorationIconSuccess,
    DecorationIconError,
    HoverDelay,
    PlaceholderStrategy,
    LogLevel,
}

impl SettingKey {
    /// Every key, in declaration order.
    pub const ALL: [SettingKey; 9] = [
        SettingKey::FontSize,
        SettingKey::LineHeight,
        SettingKey::DecorationsEnabled,
        SettingKey::DecorationIcon,
        SettingKey::DecorationIconSuccess,
        SettingKey::DecorationIconError,
        SettingKey::HoverDelay,
        SettingKey::PlaceholderStrategy,
        SettingKey::LogLevel,
    ];

    /// Dotted identifier used in logs and change events.
    pub fn id(self) -> &'static str {
        match self {
            SettingKey::FontSize => "terminal.integrated.fontSize",
            SettingKey::LineHeight => "terminal.integrated.lineHeight",
            SettingKey::DecorationsEnabled => {
                "terminal.integrated.shellIntegration.decorationsEnabled"
            }
            SettingKey::DecorationIcon => "terminal.integrated.shellIntegration.decorationIcon",
            SettingKey::DecorationIconSuccess => {
                "terminal.integrated.shellIntegration.decorationIconSuccess"
            }
            SettingKey::DecorationIconError => {
                "terminal.integrated.shellIntegration.decorationIconError"
            }
            SettingKey::HoverDelay => "workbench.hover.delay",
            SettingKey::PlaceholderStrategy => {
                "terminal.integrated.shellIntegration.placeholderStrategy"
            }
            SettingKey::LogLevel => "term-decor.logLevel",
        }
    }

    /// Look a key up by its dotted identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.id() == id)
    }

    /// Returns `true` for the three decoration icon keys.
    pub fn is_decoration_icon(self) -> bool {
        matches!(
            self,
            SettingKey::DecorationIcon
                | SettingKey::DecorationIconSuccess
                | SettingKey::DecorationIconError
        )
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Value of a setting, as returned by `Config::value`.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        SettingValue::Number(f64::from(value))
    }
}

impl From<u64> for SettingValue {
    fn from(value: u64) -> Self {
        SettingValue::Number(value as f64)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<PlaceholderStrategy> for SettingValue {
    fn from(value: PlaceholderStrategy) -> Self {
        let name = match value {
            PlaceholderStrategy::Retain => "retain",
            PlaceholderStrategy::DisposePrevious => "dispose_previous",
        };
        SettingValue::Text(name.to_string())
    }
}

impl From<LogLevel> for SettingValue {
    fn from(value: LogLevel) -> Self {
        SettingValue::Text(value.display_name().to_ascii_lowercase())
    }
}

/// Result of inspecting a setting: the effective value and the built-in
/// default.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectedSetting {
    pub value: SettingValue,
    pub default_value: SettingValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ids_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_id(key.id()), Some(key));
        }
        assert_eq!(SettingKey::from_id("editor.fontSize"), None);
    }

    #[test]
    fn test_icon_keys() {
        assert!(SettingKey::DecorationIconError.is_decoration_icon());
        assert!(!SettingKey::FontSize.is_decoration_icon());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(SettingValue::from(14.0_f32).as_f64(), Some(14.0));
        assert_eq!(SettingValue::from(true).as_bool(), Some(true));
        assert_eq!(SettingValue::from("x").as_str(), Some("x"));
        assert_eq!(SettingValue::from(true).as_f64(), None);
    }
}
