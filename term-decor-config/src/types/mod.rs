//! Configuration types and enums.
//!
//! This module is split into focused sub-modules by domain:
//! - `decoration`: Placeholder strategy for in-flight command decorations
//! - `setting`   : Setting keys and dynamically typed setting values
//! - `terminal`  : Log level

pub mod decoration;
pub mod setting;
pub mod terminal;

pub use decoration::PlaceholderStrategy;
pub use setting::{InspectedSetting, SettingKey, SettingValue};
pub use terminal::LogLevel;
