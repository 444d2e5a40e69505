//! Context menu actions, hover text and pointer listener wiring for
//! rendered decorations.

use super::relative_time::from_now;
use chrono::{DateTime, Utc};
use term_decor_terminal::{DecorationElement, PointerEvent, Sequenced, Subscription, TerminalCommand};

/// Exit code reported when a command failed without a usable exit status.
pub const FAILED_EXIT_CODE: i32 = -1;

const HOVER_HEADER: &str = "Show Command Actions...\n\n---\n\n";

/// An entry in a decoration's context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Copy the captured output of the command
    CopyOutput { output: String },
    /// Ask the host to run the command again
    RerunCommand { command: String },
}

impl CommandAction {
    pub fn id(&self) -> &'static str {
        match self {
            CommandAction::CopyOutput { .. } => "terminal.copyOutput",
            CommandAction::RerunCommand { .. } => "terminal.rerunCommand",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CommandAction::CopyOutput { .. } => "Copy Output",
            CommandAction::RerunCommand { .. } => "Re-run Command",
        }
    }

    /// CSS class of the menu entry.
    pub fn class(&self) -> &'static str {
        match self {
            CommandAction::CopyOutput { .. } => "copy-output",
            CommandAction::RerunCommand { .. } => "rerun-command",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            CommandAction::CopyOutput { .. } => "Copy Output",
            CommandAction::RerunCommand { .. } => "Rerun Command",
        }
    }
}

/// Menu entries for `command`, in display order.
pub fn command_actions(command: &TerminalCommand) -> Vec<CommandAction> {
    let mut actions = Vec::with_capacity(2);
    if let Some(output) = command.output() {
        actions.push(CommandAction::CopyOutput {
            output: output.to_string(),
        });
    }
    actions.push(CommandAction::RerunCommand {
        command: command.command.clone(),
    });
    actions
}

/// How a finished command is described in its hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Succeeded,
    Failed,
    FailedWithExitCode(i32),
}

impl CommandStatus {
    pub fn from_exit_code(exit_code: i32) -> Self {
        match exit_code {
            0 => CommandStatus::Succeeded,
            FAILED_EXIT_CODE => CommandStatus::Failed,
            code => CommandStatus::FailedWithExitCode(code),
        }
    }
}

/// Markdown shown when hovering a finished command's decoration.
pub fn hover_content(exit_code: i32, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let ago = from_now(timestamp, now);
    let body = match CommandStatus::from_exit_code(exit_code) {
        CommandStatus::Succeeded => format!("Command executed {ago}"),
        CommandStatus::Failed => format!("Command executed {ago} and failed"),
        CommandStatus::FailedWithExitCode(code) => {
            format!("Command executed {ago} and failed (Exit Code {code})")
        }
    };
    format!("{HOVER_HEADER}{body}")
}

/// Which interaction a pointer listener drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerRole {
    ContextMenu,
    Hover,
}

impl ListenerRole {
    pub fn accepts(self, event: PointerEvent) -> bool {
        match self {
            ListenerRole::ContextMenu => event == PointerEvent::Click,
            ListenerRole::Hover => matches!(
                event,
                PointerEvent::MouseEnter | PointerEvent::MouseLeave | PointerEvent::MouseOut
            ),
        }
    }
}

/// A pointer subscription on a decoration element, scoped to one role.
#[derive(Debug)]
pub struct ElementListener {
    role: ListenerRole,
    subscription: Subscription<PointerEvent>,
}

impl ElementListener {
    pub fn new(role: ListenerRole, element: &DecorationElement) -> Self {
        Self {
            role,
            subscription: element.listen(),
        }
    }

    pub fn role(&self) -> ListenerRole {
        self.role
    }

    /// Queued events this listener cares about.
    pub fn drain(&self) -> Vec<Sequenced<PointerEvent>> {
        let role = self.role;
        self.subscription
            .drain()
            .into_iter()
            .filter(|event| role.accepts(event.value))
            .collect()
    }

    pub fn dispose(&mut self) {
        self.subscription.dispose();
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

/// Attach the context menu and hover listeners to `element`.
pub fn attach_interactions(element: &DecorationElement) -> Vec<ElementListener> {
    vec![
        ElementListener::new(ListenerRole::ContextMenu, element),
        ElementListener::new(ListenerRole::Hover, element),
    ]
}
