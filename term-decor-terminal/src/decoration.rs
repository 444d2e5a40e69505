//! Decorations anchored to buffer markers.
//!
//! A [`Decoration`] is handed out by a [`DecorationRenderer`] for a marker.
//! Rendering happens later (or never, when the line scrolls away first); the
//! renderer then attaches a [`DecorationElement`] and fires the decoration's
//! render stream.

use crate::event::{Emitter, Subscription};
use crate::marker::Marker;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_DECORATION_ID: AtomicU64 = AtomicU64::new(1);

/// Produces decorations for markers.
///
/// Returning `None` means the renderer declined, e.g. because the marker
/// was already disposed.
pub trait DecorationRenderer: Send + Sync {
    fn register_decoration(&self, marker: &Marker) -> Option<Decoration>;
}

/// Pointer input delivered to a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEvent {
    Click,
    MouseEnter,
    MouseLeave,
    MouseOut,
}

/// Inline style overrides, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InlineStyle {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub font_size: Option<f32>,
    pub margin_left: Option<f32>,
}

#[derive(Debug, Default)]
struct ElementState {
    classes: Vec<String>,
    style: InlineStyle,
    in_first_split: bool,
    removed: bool,
}

/// Rendered element of a decoration. Clones share state.
#[derive(Clone)]
pub struct DecorationElement {
    state: Arc<Mutex<ElementState>>,
    pointer: Arc<Emitter<PointerEvent>>,
}

impl DecorationElement {
    /// Create an element. `in_first_split` tells whether it is laid out in
    /// the first (leftmost) split pane, which has extra gutter room.
    pub fn new(in_first_split: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ElementState {
                in_first_split,
                ..ElementState::default()
            })),
            pointer: Arc::new(Emitter::new()),
        }
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.lock().classes.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state.lock().classes.iter().any(|c| c == class)
    }

    /// Replace the whole class list.
    pub fn set_classes(&self, classes: Vec<String>) {
        self.state.lock().classes = classes;
    }

    pub fn style(&self) -> InlineStyle {
        self.state.lock().style
    }

    pub fn set_style(&self, style: InlineStyle) {
        self.state.lock().style = style;
    }

    pub fn is_in_first_split(&self) -> bool {
        self.state.lock().in_first_split
    }

    /// Returns `true` once the owning decoration was disposed.
    pub fn is_removed(&self) -> bool {
        self.state.lock().removed
    }

    /// Attach a pointer listener.
    pub fn listen(&self) -> Subscription<PointerEvent> {
        self.pointer.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.pointer.listener_count()
    }

    /// Deliver pointer input. Removed elements ignore input.
    pub fn dispatch(&self, event: PointerEvent) {
        if self.is_removed() {
            log::trace!("Ignoring {:?} on removed decoration element", event);
            return;
        }
        self.pointer.fire(event);
    }

    pub fn same_as(&self, other: &DecorationElement) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn remove(&self) {
        self.state.lock().removed = true;
        self.pointer.clear();
    }
}

impl fmt::Debug for DecorationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DecorationElement")
            .field("classes", &state.classes)
            .field("style", &state.style)
            .field("in_first_split", &state.in_first_split)
            .field("removed", &state.removed)
            .finish()
    }
}

struct DecorationInner {
    handle: u64,
    marker: Marker,
    element: Mutex<Option<DecorationElement>>,
    on_render: Emitter<DecorationElement>,
    disposed: AtomicBool,
}

/// Shared handle to a decoration.
#[derive(Clone)]
pub struct Decoration {
    inner: Arc<DecorationInner>,
}

impl Decoration {
    pub fn new(marker: Marker) -> Self {
        Self {
            inner: Arc::new(DecorationInner {
                handle: NEXT_DECORATION_ID.fetch_add(1, Ordering::Relaxed),
                marker,
                element: Mutex::new(None),
                on_render: Emitter::new(),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Process-unique handle id.
    pub fn handle(&self) -> u64 {
        self.inner.handle
    }

    pub fn marker(&self) -> &Marker {
        &self.inner.marker
    }

    /// The rendered element, present after the first render.
    pub fn element(&self) -> Option<DecorationElement> {
        self.inner.element.lock().clone()
    }

    /// Subscribe to render notifications. If the decoration already
    /// rendered, the current element is queued immediately.
    pub fn on_render(&self) -> Subscription<DecorationElement> {
        self.inner.on_render.subscribe_seeded(self.element())
    }

    /// Attach `element` and notify render listeners. Called by renderers.
    ///
    /// Re-rendering keeps the first element. Disposed decorations, and
    /// decorations whose marker is gone, do not render.
    pub fn render(&self, element: DecorationElement) -> bool {
        if self.is_disposed() || self.inner.marker.is_disposed() {
            return false;
        }
        let element = {
            let mut slot = self.inner.element.lock();
            slot.get_or_insert(element).clone()
        };
        self.inner.on_render.fire(element);
        true
    }

    pub fn is_rendered(&self) -> bool {
        self.inner.element.lock().is_some()
    }

    /// Dispose the decoration and remove its element. Idempotent.
    ///
    /// The marker is left alone; markers are disposed separately.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(element) = self.inner.element.lock().as_ref() {
            element.remove();
        }
        self.inner.on_render.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    pub fn same_as(&self, other: &Decoration) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoration")
            .field("handle", &self.inner.handle)
            .field("marker", &self.inner.marker)
            .field("rendered", &self.is_rendered())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_notifies_listener_once_per_render() {
        let decoration = Decoration::new(Marker::new(0, 0));
        let renders = decoration.on_render();

        assert!(decoration.render(DecorationElement::new(false)));
        let first = decoration.element().expect("rendered");
        assert!(decoration.render(DecorationElement::new(true)));

        let delivered = renders.drain();
        assert_eq!(delivered.len(), 2);
        assert!(delivered[1].value.same_as(&first));
    }

    #[test]
    fn test_late_subscriber_sees_existing_element() {
        let decoration = Decoration::new(Marker::new(0, 0));
        decoration.render(DecorationElement::new(false));
        assert_eq!(decoration.on_render().pending(), 1);
    }

    #[test]
    fn test_disposed_decoration_does_not_render() {
        let marker = Marker::new(0, 0);
        let decoration = Decoration::new(marker.clone());
        decoration.dispose();
        decoration.dispose();
        assert!(!decoration.render(DecorationElement::new(false)));
        assert!(!marker.is_disposed());

        let orphan = Decoration::new(Marker::new(1, 0));
        orphan.marker().dispose();
        assert!(!orphan.render(DecorationElement::new(false)));
    }

    #[test]
    fn test_dispose_removes_element_and_listeners() {
        let decoration = Decoration::new(Marker::new(0, 0));
        let element = DecorationElement::new(false);
        decoration.render(element.clone());
        let clicks = element.listen();

        decoration.dispose();
        element.dispatch(PointerEvent::Click);

        assert!(element.is_removed());
        assert_eq!(clicks.pending(), 0);
        assert_eq!(element.listener_count(), 0);
    }

    #[test]
    fn test_element_classes_and_style() {
        let element = DecorationElement::new(true);
        element.set_classes(vec!["a".to_string(), "b".to_string()]);
        assert!(element.has_class("b"));
        assert!(!element.has_class("c"));
        assert!(element.is_in_first_split());

        let style = InlineStyle {
            width: Some(16.0),
            ..InlineStyle::default()
        };
        element.set_style(style);
        assert_eq!(element.style(), style);
    }
}
