//! YAML session scripts for `term-decor replay`.
//!
//! ```yaml
//! scrollback: 200
//! steps:
//!   - step: add_capability
//!     capability: command_detection
//!   - step: command_started
//!     command: cargo test
//!   - step: render
//!   - step: command_finished
//!     command: cargo test
//!     exit_code: 101
//!   - step: render
//!   - step: pointer
//!     event: mouse_enter
//!   - step: wait
//!     ms: 600
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use term_decor_terminal::{MarkerId, PointerEvent, TerminalCapability};

fn default_scrollback() -> usize {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Lines kept in the scroll buffer before markers scroll out
    #[serde(default = "default_scrollback")]
    pub scrollback: usize,

    /// Whether decorations are laid out in the first split pane
    #[serde(default)]
    pub in_first_split: bool,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted action. Pending events are processed after every step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    AddCapability {
        capability: TerminalCapability,
    },
    RemoveCapability {
        capability: TerminalCapability,
    },
    /// Place a marker at the cursor and report the command as started
    CommandStarted {
        command: String,
    },
    /// Report the running command (or a new one at the cursor) as finished
    CommandFinished {
        command: String,
        #[serde(default)]
        exit_code: Option<i32>,
        #[serde(default)]
        output: Option<String>,
        /// Backdate the command by this many seconds
        #[serde(default)]
        ago_secs: Option<i64>,
    },
    /// Render every pending decoration
    Render,
    /// Print lines, scrolling old markers out of the buffer
    Output {
        lines: usize,
    },
    /// Dispatch pointer input to a decoration (the most recent one by default)
    Pointer {
        #[serde(default)]
        marker: Option<MarkerId>,
        event: PointerEvent,
    },
    /// Close the open context menu
    DismissMenu,
    /// Pick a context menu action by id, e.g. `terminal.copyOutput`
    RunAction {
        #[serde(default)]
        marker: Option<MarkerId>,
        action: String,
    },
    /// Merge these keys into the current config
    Settings {
        patch: serde_yaml_ng::Mapping,
    },
    Wait {
        ms: u64,
    },
}

impl Script {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml_ng::from_str(contents).context("Invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse replay script {}", path.display()))
    }
}
