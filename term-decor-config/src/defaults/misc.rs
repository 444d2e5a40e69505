//! Miscellaneous default values.

use crate::types::LogLevel;

pub fn hover_delay_ms() -> u64 {
    500
}

pub fn log_level() -> LogLevel {
    LogLevel::Off
}
