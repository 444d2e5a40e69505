//! File-backed logging for term-decor.
//!
//! Every `log::info!()` / `log::debug!()` call in the workspace is routed to
//! `term_decor_debug.log` in the system temp directory, which keeps replay
//! output on stdout clean. When `RUST_LOG` is set, records are mirrored to
//! stderr as well.
//!
//! Level precedence: `--log-level` flag, then `RUST_LOG`, then the config
//! file's `log_level` (applied once the config is loaded).

use crate::config::LogLevel;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const LOG_FILE_NAME: &str = "term_decor_debug.log";

/// Set when the level came from the CLI or `RUST_LOG` and must not be
/// overridden by the config file.
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

struct DebugLogger {
    file: Mutex<Option<File>>,
    mirror_to_stderr: bool,
}

impl DebugLogger {
    fn open(mirror_to_stderr: bool) -> Self {
        let file = match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(mut f) => {
                let _ = writeln!(
                    f,
                    "{}\nterm-decor debug session started at {}\n{}",
                    "=".repeat(80),
                    timestamp(),
                    "=".repeat(80)
                );
                Some(f)
            }
            // Logging must never break the program it observes.
            Err(_) => None,
        };
        Self {
            file: Mutex::new(file),
            mirror_to_stderr,
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_to_stderr {
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn env_level() -> Option<LevelFilter> {
    let value = std::env::var("RUST_LOG").ok()?;
    // Only the global level is honoured; per-target directives are ignored.
    value
        .split(',')
        .find(|directive| !directive.contains('='))
        .and_then(|level| level.trim().parse().ok())
}

/// Install the logger. Safe to call more than once; later calls only
/// adjust the level.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let env = env_level();
    let mirror = std::env::var_os("RUST_LOG").is_some();

    let level = match (cli_level, env) {
        (Some(level), _) => Some(level.to_level_filter()),
        (None, Some(level)) => Some(level),
        (None, None) => None,
    };
    LEVEL_PINNED.store(level.is_some(), Ordering::Release);

    let logger = LOGGER.get_or_init(|| DebugLogger::open(mirror));
    if log::set_logger(logger).is_err() {
        log::debug!("Logger already installed");
    }
    log::set_max_level(level.unwrap_or(LevelFilter::Off));
}

/// Apply the config file's level unless the CLI or `RUST_LOG` chose one.
pub fn apply_config_level(level: LogLevel) {
    if LEVEL_PINNED.load(Ordering::Acquire) {
        return;
    }
    log::set_max_level(level.to_level_filter());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_in_temp_dir() {
        let path = log_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        let (secs, micros) = ts.split_once('.').expect("fractional part");
        assert!(secs.parse::<u64>().is_ok());
        assert_eq!(micros.len(), 6);
    }
}
