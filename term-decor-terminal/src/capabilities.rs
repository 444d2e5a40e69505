//! Terminal capabilities.
//!
//! A capability is a feature a terminal session may or may not support at
//! a given moment (shell integration can be installed or lost mid-session).
//! The [`CapabilityStore`] announces additions and removals so consumers can
//! attach to a capability's streams only while it exists.

use crate::command::TerminalCommand;
use crate::event::{Emitter, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Kinds of capability a terminal session may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalCapability {
    /// Working directory reporting (OSC 7)
    CwdDetection,
    /// Full command lifecycle reporting (OSC 133 prompt/command/finished marks)
    CommandDetection,
    /// Prompt marks only, without command boundaries
    PartialCommandDetection,
}

/// Command lifecycle streams produced by shell integration.
#[derive(Debug, Default)]
pub struct CommandDetectionCapability {
    on_command_started: Emitter<TerminalCommand>,
    on_command_finished: Emitter<TerminalCommand>,
}

impl CommandDetectionCapability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_command_started(&self) -> Subscription<TerminalCommand> {
        self.on_command_started.subscribe()
    }

    pub fn on_command_finished(&self) -> Subscription<TerminalCommand> {
        self.on_command_finished.subscribe()
    }

    /// Announce that `command` started executing (OSC 133;C).
    pub fn fire_command_started(&self, command: TerminalCommand) {
        log::debug!("Command started: {:?}", command.command);
        self.on_command_started.fire(command);
    }

    /// Announce that `command` finished (OSC 133;D).
    pub fn fire_command_finished(&self, command: TerminalCommand) {
        log::debug!(
            "Command finished: {:?} (exit code {:?})",
            command.command,
            command.exit_code
        );
        self.on_command_finished.fire(command);
    }

    /// Listener counts for the started and finished streams.
    pub fn listener_counts(&self) -> (usize, usize) {
        (
            self.on_command_started.listener_count(),
            self.on_command_finished.listener_count(),
        )
    }
}

#[derive(Debug, Default)]
struct StoreState {
    present: BTreeSet<TerminalCapability>,
    command_detection: Option<Arc<CommandDetectionCapability>>,
}

/// Set of capabilities currently supported by a terminal session.
#[derive(Debug, Default)]
pub struct CapabilityStore {
    state: Mutex<StoreState>,
    on_did_add: Emitter<TerminalCapability>,
    on_did_remove: Emitter<TerminalCapability>,
}

impl CapabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, capability: TerminalCapability) -> bool {
        self.state.lock().present.contains(&capability)
    }

    /// The command detection capability, if present.
    pub fn command_detection(&self) -> Option<Arc<CommandDetectionCapability>> {
        self.state.lock().command_detection.clone()
    }

    /// Capabilities currently present, in a stable order.
    pub fn items(&self) -> Vec<TerminalCapability> {
        self.state.lock().present.iter().copied().collect()
    }

    pub fn on_did_add_capability(&self) -> Subscription<TerminalCapability> {
        self.on_did_add.subscribe()
    }

    pub fn on_did_remove_capability(&self) -> Subscription<TerminalCapability> {
        self.on_did_remove.subscribe()
    }

    /// Install the command detection capability, replacing any previous one.
    pub fn add_command_detection(&self, capability: Arc<CommandDetectionCapability>) {
        {
            let mut state = self.state.lock();
            state.present.insert(TerminalCapability::CommandDetection);
            state.command_detection = Some(capability);
        }
        log::info!("Capability added: {:?}", TerminalCapability::CommandDetection);
        self.on_did_add.fire(TerminalCapability::CommandDetection);
    }

    /// Add a capability that carries no streams of its own.
    ///
    /// Adding `CommandDetection` through this method installs a fresh
    /// [`CommandDetectionCapability`].
    pub fn add(&self, capability: TerminalCapability) {
        if capability == TerminalCapability::CommandDetection {
            self.add_command_detection(Arc::new(CommandDetectionCapability::new()));
            return;
        }
        let inserted = self.state.lock().present.insert(capability);
        if inserted {
            log::info!("Capability added: {:?}", capability);
            self.on_did_add.fire(capability);
        }
    }

    /// Remove a capability. Removing an absent capability does nothing.
    pub fn remove(&self, capability: TerminalCapability) {
        let removed = {
            let mut state = self.state.lock();
            if capability == TerminalCapability::CommandDetection {
                state.command_detection = None;
            }
            state.present.remove(&capability)
        };
        if removed {
            log::info!("Capability removed: {:?}", capability);
            self.on_did_remove.fire(capability);
        }
    }
}
