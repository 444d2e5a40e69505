//! Shared integration test helpers for term-decor.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::Harness;
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use term_decor::config::Config;
use term_decor::decorations::{AddonServices, DecorationAddon};
use term_decor::replay::{RecordingClipboard, RecordingContextMenu, RecordingHover};
use term_decor::settings::ConfigurationService;
use term_decor_terminal::{
    CapabilityStore, CommandDetectionCapability, DecorationElement, DecorationHost, Marker,
    MarkerId, ScrollbackBuffer, TerminalCapability, TerminalCommand,
};

/// Scrollback size used by [`Harness::new`].
pub const SCROLLBACK: usize = 100;

/// A decoration addon wired to a headless host, a scroll buffer and
/// recording services.
pub struct Harness {
    pub buffer: ScrollbackBuffer,
    pub capabilities: Arc<CapabilityStore>,
    pub settings: Arc<ConfigurationService>,
    pub host: Arc<DecorationHost>,
    pub clipboard: Arc<RecordingClipboard>,
    pub menu: Arc<RecordingContextMenu>,
    pub hover: Arc<RecordingHover>,
    pub addon: DecorationAddon,
    /// Clock handed to `process_events_at`
    pub now: Instant,
}

impl Harness {
    /// Activated addon with default config and no capabilities.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, Arc::new(CapabilityStore::new()))
    }

    /// Activated addon on a session whose command detection was added after
    /// the addon attached.
    pub fn with_command_detection() -> Self {
        let mut harness = Self::new();
        harness.capabilities.add(TerminalCapability::CommandDetection);
        harness.pump();
        harness
    }

    /// Addon created for a session that already has command detection.
    pub fn with_existing_detection(config: Config) -> Self {
        let capabilities = Arc::new(CapabilityStore::new());
        capabilities.add(TerminalCapability::CommandDetection);
        Self::build(config, capabilities)
    }

    fn build(config: Config, capabilities: Arc<CapabilityStore>) -> Self {
        let settings = Arc::new(ConfigurationService::new(config));
        let host = Arc::new(DecorationHost::new(false));
        let clipboard = Arc::new(RecordingClipboard::new());
        let menu = Arc::new(RecordingContextMenu::new());
        let hover = Arc::new(RecordingHover::new());
        let services = AddonServices {
            clipboard: clipboard.clone(),
            context_menu: menu.clone(),
            hover: hover.clone(),
        };
        let mut addon = DecorationAddon::new(capabilities.clone(), settings.clone(), services);
        addon.activate(host.clone());

        Self {
            buffer: ScrollbackBuffer::new(SCROLLBACK),
            capabilities,
            settings,
            host,
            clipboard,
            menu,
            hover,
            addon,
            now: Instant::now(),
        }
    }

    pub fn detection(&self) -> Arc<CommandDetectionCapability> {
        self.capabilities
            .command_detection()
            .expect("command detection capability")
    }

    /// Process queued events at the harness clock.
    pub fn pump(&mut self) -> usize {
        self.addon.process_events_at(self.now)
    }

    /// Handle queued input at the current time, then move the clock forward
    /// and process again.
    pub fn advance(&mut self, by: Duration) {
        self.pump();
        self.now += by;
        self.pump();
    }

    /// Render every pending decoration and process the render events.
    pub fn render(&mut self) {
        self.host.render_pending();
        self.pump();
    }

    /// Fire a command start at the cursor line and return its marker.
    pub fn start(&mut self, command: &str) -> Marker {
        let marker = self.buffer.register_marker();
        self.detection()
            .fire_command_started(TerminalCommand::new(command, Some(marker.clone())));
        marker
    }

    pub fn finish(&mut self, command: TerminalCommand) {
        self.detection().fire_command_finished(command);
        self.buffer.push_lines(1);
    }

    /// Start, render, finish and render one command. Returns its marker.
    pub fn run_command(&mut self, command: &str, exit_code: Option<i32>) -> Marker {
        let marker = self.start(command);
        self.pump();
        self.render();
        let mut finished = TerminalCommand::new(command, Some(marker.clone()));
        if let Some(code) = exit_code {
            finished = finished.with_exit_code(code);
        }
        self.finish(finished);
        self.pump();
        self.render();
        marker
    }

    /// Rendered element of the decoration tracked for `marker`.
    pub fn element(&self, marker: &Marker) -> DecorationElement {
        let id = marker.id().expect("live marker");
        self.element_for(id)
    }

    pub fn element_for(&self, id: MarkerId) -> DecorationElement {
        self.addon
            .registry()
            .get(id)
            .and_then(|record| record.decoration.element())
            .expect("rendered decoration")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A command with a marker at `line`, outside any buffer.
pub fn command_at(command: &str, id: MarkerId, line: usize) -> TerminalCommand {
    TerminalCommand::new(command, Some(Marker::new(id, line)))
}

/// Creates a temporary config directory and returns the config file path
/// inside it. The `TempDir` must be kept alive for the duration of the test.
pub fn setup_config_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("term-decor").join("config.yaml");
    (temp_dir, path)
}
