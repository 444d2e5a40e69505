//! Host services consumed by the decoration manager.
//!
//! These traits document the contracts between the decoration manager and
//! the UI it runs in, and enable recording implementations for tests and
//! headless replays without a windowing system.

use crate::decorations::CommandAction;
use term_decor_terminal::{DecorationElement, Subscription};

/// Writes text to the system clipboard.
pub trait ClipboardService: Send + Sync {
    fn write_text(&self, text: &str) -> anyhow::Result<()>;
}

/// Visibility transitions reported by the context menu subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuVisibility {
    Shown,
    Hidden,
}

/// A context menu anchored at a decoration element.
#[derive(Debug, Clone)]
pub struct ContextMenuRequest {
    pub anchor: DecorationElement,
    pub actions: Vec<CommandAction>,
}

/// Shows context menus.
///
/// The service reports when a menu opens and closes so that hovers can be
/// suppressed meanwhile. Picking an entry is reported back by the host
/// through `DecorationAddon::run_action`.
pub trait ContextMenuService: Send + Sync {
    fn show_context_menu(&self, request: ContextMenuRequest);

    /// Stream of open/close notifications.
    fn on_did_change_visibility(&self) -> Subscription<ContextMenuVisibility>;
}

/// A rich tooltip anchored at a decoration element.
#[derive(Debug, Clone)]
pub struct HoverRequest {
    /// Markdown content
    pub content: String,
    pub target: DecorationElement,
}

/// Shows and hides hovers.
pub trait HoverService: Send + Sync {
    fn show_hover(&self, request: HoverRequest);

    /// Hide the current hover. Must be a no-op when nothing is shown.
    fn hide_hover(&self);
}

/// Clipboard backed by the OS clipboard through `arboard`.
///
/// A fresh `arboard::Clipboard` is opened per write; on Linux the contents
/// are owned by that handle only while it lives, so long-running hosts that
/// need persistence should keep their own clipboard manager.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardService for SystemClipboard {
    fn write_text(&self, text: &str) -> anyhow::Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        log::debug!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }
}
