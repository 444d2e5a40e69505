//! Headless decoration sessions driven by a script.
//!
//! A [`ReplaySession`] wires a [`DecorationAddon`] to a [`ScrollbackBuffer`],
//! a [`DecorationHost`] and recording services, runs script steps against
//! them, and summarises what the UI would have shown.

pub mod recorder;
pub mod script;

pub use recorder::{RecordingClipboard, RecordingContextMenu, RecordingHover};
pub use script::{Script, Step};

use crate::config::Config;
use crate::decorations::{AddonServices, AddonSnapshot, DecorationAddon, command_actions};
use crate::services::ClipboardService;
use crate::settings::ConfigurationService;
use anyhow::{Context, Result, anyhow};
use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use term_decor_terminal::{
    CapabilityStore, DecorationElement, DecorationHost, Marker, MarkerId, ScrollbackBuffer,
    Subscription, TerminalCommand,
};

/// What a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub state: AddonSnapshot,
    /// Markdown of every hover shown, in order
    pub hovers: Vec<String>,
    /// Action labels of every context menu shown, in order
    pub menus: Vec<Vec<String>>,
    pub clipboard: Vec<String>,
    pub rerun_requests: Vec<String>,
    /// Steps that could not be applied
    pub errors: Vec<String>,
}

pub struct ReplaySession {
    buffer: ScrollbackBuffer,
    capabilities: Arc<CapabilityStore>,
    settings: Arc<ConfigurationService>,
    host: Arc<DecorationHost>,
    clipboard: Arc<RecordingClipboard>,
    menu: Arc<RecordingContextMenu>,
    hover: Arc<RecordingHover>,
    addon: DecorationAddon,
    rerun: Subscription<String>,
    rerun_requests: Vec<String>,
    running: Option<Marker>,
    steps: usize,
    errors: Vec<String>,
}

impl ReplaySession {
    pub fn new(config: Config, scrollback: usize, in_first_split: bool) -> Self {
        Self::with_clipboard(config, scrollback, in_first_split, None)
    }

    /// Like [`new`](Self::new), but "Copy Output" also writes to `clipboard`.
    pub fn with_clipboard(
        config: Config,
        scrollback: usize,
        in_first_split: bool,
        clipboard: Option<Arc<dyn ClipboardService>>,
    ) -> Self {
        let capabilities = Arc::new(CapabilityStore::new());
        let settings = Arc::new(ConfigurationService::new(config));
        let host = Arc::new(DecorationHost::new(in_first_split));
        let clipboard = Arc::new(match clipboard {
            Some(target) => RecordingClipboard::forwarding(target),
            None => RecordingClipboard::new(),
        });
        let menu = Arc::new(RecordingContextMenu::new());
        let hover = Arc::new(RecordingHover::new());

        let services = AddonServices {
            clipboard: clipboard.clone(),
            context_menu: menu.clone(),
            hover: hover.clone(),
        };
        let mut addon = DecorationAddon::new(capabilities.clone(), settings.clone(), services);
        addon.activate(host.clone());
        let rerun = addon.on_did_request_run_command();

        Self {
            buffer: ScrollbackBuffer::new(scrollback),
            capabilities,
            settings,
            host,
            clipboard,
            menu,
            hover,
            addon,
            rerun,
            rerun_requests: Vec::new(),
            running: None,
            steps: 0,
            errors: Vec::new(),
        }
    }

    pub fn addon(&self) -> &DecorationAddon {
        &self.addon
    }

    /// Apply one step and process the events it caused. Failures are
    /// recorded in the report rather than aborting the replay.
    pub async fn apply(&mut self, step: &Step) {
        self.steps += 1;
        if let Err(e) = self.apply_step(step).await {
            log::warn!("Replay step {} failed: {:#}", self.steps, e);
            self.errors.push(format!("step {}: {:#}", self.steps, e));
        }
        self.pump();
    }

    async fn apply_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::AddCapability { capability } => self.capabilities.add(*capability),
            Step::RemoveCapability { capability } => self.capabilities.remove(*capability),
            Step::CommandStarted { command } => {
                let detection = self
                    .capabilities
                    .command_detection()
                    .ok_or_else(|| anyhow!("command detection is not available"))?;
                let marker = self.buffer.register_marker();
                self.running = Some(marker.clone());
                detection.fire_command_started(TerminalCommand::new(command.clone(), Some(marker)));
            }
            Step::CommandFinished {
                command,
                exit_code,
                output,
                ago_secs,
            } => {
                let detection = self
                    .capabilities
                    .command_detection()
                    .ok_or_else(|| anyhow!("command detection is not available"))?;
                let marker = match self.running.take() {
                    Some(marker) if !marker.is_disposed() => marker,
                    _ => self.buffer.register_marker(),
                };
                let mut finished = TerminalCommand::new(command.clone(), Some(marker))
                    .with_timestamp(Utc::now() - ChronoDuration::seconds(ago_secs.unwrap_or(0)));
                if let Some(code) = exit_code {
                    finished = finished.with_exit_code(*code);
                }
                let printed = output.as_deref().map_or(0, |o| o.lines().count());
                if let Some(output) = output {
                    finished = finished.with_output(output.clone());
                }
                detection.fire_command_finished(finished);
                self.buffer.push_lines(1 + printed);
            }
            Step::Render => {
                self.host.render_pending();
            }
            Step::Output { lines } => {
                self.buffer.push_lines(*lines);
            }
            Step::Pointer { marker, event } => {
                let element = self.target_element(*marker)?;
                element.dispatch(*event);
            }
            Step::DismissMenu => self.menu.close(),
            Step::RunAction { marker, action } => {
                let id = self.target_id(*marker)?;
                let record = self
                    .addon
                    .registry()
                    .get(id)
                    .ok_or_else(|| anyhow!("no decoration for marker {}", id))?;
                let picked = command_actions(&record.command)
                    .into_iter()
                    .find(|a| a.id() == action)
                    .ok_or_else(|| anyhow!("action {} is not offered for marker {}", action, id))?;
                self.addon.run_action(&picked)?;
            }
            Step::Settings { patch } => {
                let config = apply_patch(&self.settings.get(), patch)?;
                self.settings.update(config);
            }
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
        }
        Ok(())
    }

    fn pump(&mut self) {
        self.addon.process_events();
        self.rerun_requests
            .extend(self.rerun.drain().into_iter().map(|request| request.value));
    }

    /// Marker id of `marker`, or of the most recent decoration.
    fn target_id(&self, marker: Option<MarkerId>) -> Result<MarkerId> {
        if let Some(id) = marker {
            return Ok(id);
        }
        self.addon
            .registry()
            .iter()
            .max_by_key(|(_, record)| record.decoration.marker().line())
            .map(|(id, _)| *id)
            .ok_or_else(|| anyhow!("no decorations to target"))
    }

    fn target_element(&self, marker: Option<MarkerId>) -> Result<DecorationElement> {
        let id = self.target_id(marker)?;
        self.addon
            .registry()
            .get(id)
            .and_then(|record| record.decoration.element())
            .ok_or_else(|| anyhow!("decoration for marker {} has not rendered", id))
    }

    pub fn report(&self) -> ReplayReport {
        ReplayReport {
            steps: self.steps,
            state: self.addon.snapshot(),
            hovers: self.hover.shown().into_iter().map(|h| h.content).collect(),
            menus: self
                .menu
                .requests()
                .iter()
                .map(|request| request.actions.iter().map(|a| a.label().to_string()).collect())
                .collect(),
            clipboard: self.clipboard.writes(),
            rerun_requests: self.rerun_requests.clone(),
            errors: self.errors.clone(),
        }
    }

    pub fn dispose(&mut self) {
        self.addon.dispose();
    }
}

/// Merge top-level `patch` keys into `config`.
pub fn apply_patch(config: &Config, patch: &serde_yaml_ng::Mapping) -> Result<Config> {
    let mut value = serde_yaml_ng::to_value(config).context("Failed to serialize config")?;
    if let serde_yaml_ng::Value::Mapping(map) = &mut value {
        for (key, patched) in patch {
            map.insert(key.clone(), patched.clone());
        }
    }
    let patched: Config = serde_yaml_ng::from_value(value).context("Invalid settings patch")?;
    patched.validate()?;
    Ok(patched)
}

/// Run `script` to completion and report.
pub async fn replay(script: &Script, config: Config) -> ReplayReport {
    replay_with_clipboard(script, config, None).await
}

/// [`replay`], passing copied output on to `clipboard` as well.
pub async fn replay_with_clipboard(
    script: &Script,
    config: Config,
    clipboard: Option<Arc<dyn ClipboardService>>,
) -> ReplayReport {
    log::info!("Replaying {} step(s)", script.steps.len());
    let mut session = ReplaySession::with_clipboard(
        config,
        script.scrollback,
        script.in_first_split,
        clipboard,
    );
    for step in &script.steps {
        session.apply(step).await;
    }
    let report = session.report();
    session.dispose();
    report
}
