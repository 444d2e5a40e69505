//! Commands reported by shell integration.

use crate::marker::Marker;
use chrono::{DateTime, Utc};

/// A shell command detected through shell integration.
///
/// Snapshots are cheap to clone; the marker is a shared handle.
#[derive(Debug, Clone)]
pub struct TerminalCommand {
    /// Command line as typed by the user
    pub command: String,
    /// Marker on the prompt line. Required for decorations.
    pub marker: Option<Marker>,
    /// Exit code, `None` while running or when the shell did not report it
    pub exit_code: Option<i32>,
    /// When the command was executed
    pub timestamp: DateTime<Utc>,
    /// Captured output, if the shell integration recorded any
    pub output: Option<String>,
}

impl TerminalCommand {
    pub fn new(command: impl Into<String>, marker: Option<Marker>) -> Self {
        Self {
            command: command.into(),
            marker,
            exit_code: None,
            timestamp: Utc::now(),
            output: None,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns `true` if output was captured (an empty capture counts).
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}
