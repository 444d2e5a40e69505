use anyhow::Result;
use std::sync::Arc;
use term_decor::cli::{self, CliResult};
use term_decor::config::Config;
use term_decor::replay::{self, Script};
use term_decor::services::{ClipboardService, SystemClipboard};
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let (result, log_level) = cli::process_cli();
    let options = match result {
        CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        CliResult::Replay(options) => options,
    };

    // CLI --log-level takes precedence, then RUST_LOG, then config (below).
    term_decor::debug::init_log_bridge(log_level);
    log::info!("Starting term-decor {}", term_decor::VERSION);

    let config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    term_decor::debug::apply_config_level(config.log_level);

    let script = Script::load(&options.script)?;

    let clipboard = options
        .system_clipboard
        .then(|| Arc::new(SystemClipboard) as Arc<dyn ClipboardService>);

    let runtime = Runtime::new()?;
    let report = runtime.block_on(replay::replay_with_clipboard(&script, config, clipboard));
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    let json = if options.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    log::info!(
        "Replay finished: {} step(s), {} error(s)",
        report.steps,
        report.errors.len()
    );
    if !report.errors.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}
