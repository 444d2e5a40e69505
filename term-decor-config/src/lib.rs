//! Configuration system for the term-decor command decoration manager.
//!
//! This crate provides configuration loading, saving, and default values
//! for shell integration decorations. It includes:
//!
//! - The `Config` struct and its serde defaults
//! - Setting keys, dynamically typed values and `inspect` support
//! - YAML persistence with validation
//! - Configuration file watching

pub mod config;
pub mod defaults;
pub mod error;
mod types;
#[cfg(feature = "watcher")]
pub mod watcher;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::{InspectedSetting, LogLevel, PlaceholderStrategy, SettingKey, SettingValue};
#[cfg(feature = "watcher")]
pub use watcher::{ConfigReloadEvent, ConfigWatcher};
