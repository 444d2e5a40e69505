//! Services that record what the decoration addon asked of the UI.
//!
//! Used by headless replays and integration tests.

use crate::services::{
    ClipboardService, ContextMenuRequest, ContextMenuService, ContextMenuVisibility, HoverRequest,
    HoverService,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use term_decor_terminal::{Emitter, Subscription};

/// Clipboard that records writes and optionally passes them on to another
/// clipboard, such as [`SystemClipboard`](crate::services::SystemClipboard).
#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
    unavailable: AtomicBool,
    forward: Option<Arc<dyn ClipboardService>>,
}

impl fmt::Debug for RecordingClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingClipboard")
            .field("writes", &self.writes.lock().len())
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record writes, then hand them to `target`. A failing target fails
    /// the write and nothing is recorded.
    pub fn forwarding(target: Arc<dyn ClipboardService>) -> Self {
        Self {
            forward: Some(target),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

impl ClipboardService for RecordingClipboard {
    fn write_text(&self, text: &str) -> anyhow::Result<()> {
        if self.unavailable.load(Ordering::Acquire) {
            anyhow::bail!("clipboard unavailable");
        }
        if let Some(target) = &self.forward {
            target.write_text(text)?;
        }
        self.writes.lock().push(text.to_string());
        Ok(())
    }
}

/// Context menu that opens instantly and stays open until [`close`]d.
///
/// [`close`]: RecordingContextMenu::close
#[derive(Debug, Default)]
pub struct RecordingContextMenu {
    requests: Mutex<Vec<ContextMenuRequest>>,
    visibility: Emitter<ContextMenuVisibility>,
    open: AtomicBool,
}

impl RecordingContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<ContextMenuRequest> {
        self.requests.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Close the menu, as if the user dismissed it.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            self.visibility.fire(ContextMenuVisibility::Hidden);
        }
    }
}

impl ContextMenuService for RecordingContextMenu {
    fn show_context_menu(&self, request: ContextMenuRequest) {
        self.requests.lock().push(request);
        if !self.open.swap(true, Ordering::AcqRel) {
            self.visibility.fire(ContextMenuVisibility::Shown);
        }
    }

    fn on_did_change_visibility(&self) -> Subscription<ContextMenuVisibility> {
        self.visibility.subscribe()
    }
}

#[derive(Debug, Default)]
pub struct RecordingHover {
    shown: Mutex<Vec<HoverRequest>>,
    visible: AtomicBool,
    hides: AtomicUsize,
}

impl RecordingHover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<HoverRequest> {
        self.shown.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Number of hides that actually hid something.
    pub fn hide_count(&self) -> usize {
        self.hides.load(Ordering::Acquire)
    }
}

impl HoverService for RecordingHover {
    fn show_hover(&self, request: HoverRequest) {
        self.shown.lock().push(request);
        self.visible.store(true, Ordering::Release);
    }

    fn hide_hover(&self) {
        if self.visible.swap(false, Ordering::AcqRel) {
            self.hides.fetch_add(1, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use term_decor_terminal::DecorationElement;

    #[test]
    fn test_menu_reports_open_and_close_once() {
        let menu = RecordingContextMenu::new();
        let visibility = menu.on_did_change_visibility();
        let request = ContextMenuRequest {
            anchor: DecorationElement::new(false),
            actions: Vec::new(),
        };
        menu.show_context_menu(request.clone());
        menu.show_context_menu(request);
        menu.close();
        menu.close();

        let changes: Vec<_> = visibility.drain().into_iter().map(|e| e.value).collect();
        assert_eq!(
            changes,
            vec![ContextMenuVisibility::Shown, ContextMenuVisibility::Hidden]
        );
        assert_eq!(menu.requests().len(), 2);
    }

    #[test]
    fn test_hide_without_hover_is_noop() {
        let hover = RecordingHover::new();
        hover.hide_hover();
        assert_eq!(hover.hide_count(), 0);
    }

    #[test]
    fn test_unavailable_clipboard() {
        let clipboard = RecordingClipboard::new();
        clipboard.set_unavailable(true);
        assert!(clipboard.write_text("x").is_err());
        assert!(clipboard.writes().is_empty());
    }

    #[test]
    fn test_forwarding_clipboard() {
        let target = Arc::new(RecordingClipboard::new());
        let clipboard = RecordingClipboard::forwarding(target.clone());
        clipboard.write_text("out").expect("written");
        assert_eq!(clipboard.writes(), vec!["out".to_string()]);
        assert_eq!(target.writes(), vec!["out".to_string()]);

        target.set_unavailable(true);
        assert!(clipboard.write_text("lost").is_err());
        assert_eq!(clipboard.writes().len(), 1);
    }
}
