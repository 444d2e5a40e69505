//! Headless decoration renderer.
//!
//! `DecorationHost` hands out decorations and renders them on demand. It
//! stands in for a GPU or DOM renderer in headless sessions (replays, tests):
//! the caller decides when a frame is drawn by calling [`render_pending`].
//!
//! [`render_pending`]: DecorationHost::render_pending

use crate::decoration::{Decoration, DecorationElement, DecorationRenderer};
use crate::marker::Marker;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct DecorationHost {
    decorations: Mutex<Vec<Decoration>>,
    in_first_split: bool,
}

impl DecorationHost {
    /// Create a host whose elements are laid out in the first split pane
    /// when `in_first_split` is set.
    pub fn new(in_first_split: bool) -> Self {
        Self {
            decorations: Mutex::new(Vec::new()),
            in_first_split,
        }
    }

    /// Render every decoration that has not rendered yet.
    ///
    /// Decorations whose marker was disposed are dropped instead; they never
    /// render. Returns the number of decorations rendered.
    pub fn render_pending(&self) -> usize {
        self.render_where(|_| true)
    }

    /// Render pending decorations whose marker satisfies `visible`, e.g. a
    /// viewport line range.
    pub fn render_where(&self, visible: impl Fn(&Marker) -> bool) -> usize {
        let mut decorations = self.decorations.lock();
        decorations.retain(|decoration| {
            if decoration.marker().is_disposed() {
                decoration.dispose();
            }
            !decoration.is_disposed()
        });

        let mut rendered = 0;
        for decoration in decorations.iter() {
            if decoration.is_rendered() || !visible(decoration.marker()) {
                continue;
            }
            if decoration.render(DecorationElement::new(self.in_first_split)) {
                rendered += 1;
            }
        }
        if rendered > 0 {
            log::trace!("Rendered {} decoration(s)", rendered);
        }
        rendered
    }

    /// Decorations that are still alive.
    pub fn live_decorations(&self) -> Vec<Decoration> {
        self.decorations
            .lock()
            .iter()
            .filter(|d| !d.is_disposed())
            .cloned()
            .collect()
    }
}

impl DecorationRenderer for DecorationHost {
    fn register_decoration(&self, marker: &Marker) -> Option<Decoration> {
        if marker.is_disposed() {
            log::debug!("Declining decoration for disposed marker {}", marker.raw_id());
            return None;
        }
        let decoration = Decoration::new(marker.clone());
        self.decorations.lock().push(decoration.clone());
        Some(decoration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declines_disposed_marker() {
        let host = DecorationHost::new(false);
        let marker = Marker::new(0, 0);
        marker.dispose();
        assert!(host.register_decoration(&marker).is_none());
    }

    #[test]
    fn test_render_pending_renders_once() {
        let host = DecorationHost::new(true);
        let decoration = host
            .register_decoration(&Marker::new(0, 0))
            .expect("decoration");

        assert_eq!(host.render_pending(), 1);
        assert_eq!(host.render_pending(), 0);
        assert!(decoration.element().expect("element").is_in_first_split());
    }

    #[test]
    fn test_scrolled_out_decorations_never_render() {
        let host = DecorationHost::new(false);
        let marker = Marker::new(0, 0);
        let decoration = host.register_decoration(&marker).expect("decoration");
        marker.dispose();

        assert_eq!(host.render_pending(), 0);
        assert!(decoration.is_disposed());
        assert!(host.live_decorations().is_empty());
    }

    #[test]
    fn test_render_where_filters_by_marker() {
        let host = DecorationHost::new(false);
        host.register_decoration(&Marker::new(0, 3));
        host.register_decoration(&Marker::new(1, 40));

        assert_eq!(host.render_where(|m| m.line() >= 10), 1);
        assert_eq!(host.render_pending(), 1);
    }
}
