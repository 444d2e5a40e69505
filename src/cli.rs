//! Command-line interface for term-decor.
//!
//! `replay` drives a headless decoration session from a YAML script;
//! `default-config` prints the default configuration.

use crate::config::{Config, LogLevel};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// term-decor - shell integration command decorations
#[derive(Parser)]
#[command(name = "term-decor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LogLevel::Off,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a session script against a headless terminal and print a JSON report
    Replay {
        /// YAML session script
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Config file to use instead of ~/.config/term-decor/config.yaml
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,

        /// Also write copied output to the system clipboard
        #[arg(long)]
        system_clipboard: bool,
    },

    /// Print the default configuration as YAML
    DefaultConfig,
}

/// Options for a replay run
#[derive(Clone, Debug)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub config: Option<PathBuf>,
    pub pretty: bool,
    pub system_clipboard: bool,
}

/// Result of CLI processing
pub enum CliResult {
    /// Run a replay
    Replay(ReplayOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Parse arguments, handle one-shot subcommands, and return what remains to
/// run along with the log level override.
pub fn process_cli() -> (CliResult, Option<LogLevel>) {
    let cli = Cli::parse();
    let log_level = cli.log_level.map(LogLevel::from);

    let result = match cli.command {
        Commands::Replay {
            script,
            config,
            pretty,
            system_clipboard,
        } => CliResult::Replay(ReplayOptions {
            script,
            config,
            pretty,
            system_clipboard,
        }),
        Commands::DefaultConfig => match Config::default().to_yaml() {
            Ok(yaml) => {
                print!("{}", yaml);
                CliResult::Exit(0)
            }
            Err(e) => {
                eprintln!("term-decor: error: {}", e);
                CliResult::Exit(1)
            }
        },
    };
    (result, log_level)
}
