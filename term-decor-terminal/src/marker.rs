//! Buffer line markers.
//!
//! A [`Marker`] pins a line of the scroll buffer. Clones share state, so a
//! marker disposed through one handle reads as disposed through all of them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Identifier of a live marker. Unique among live markers of one buffer;
/// reused only after the previous holder was disposed.
pub type MarkerId = u32;

struct MarkerInner {
    id: MarkerId,
    line: usize,
    disposed: AtomicBool,
}

/// Shared handle to a marker anchored at an absolute buffer line.
#[derive(Clone)]
pub struct Marker {
    inner: Arc<MarkerInner>,
}

impl Marker {
    /// Create a marker. Normally called by `ScrollbackBuffer`.
    pub fn new(id: MarkerId, line: usize) -> Self {
        Self {
            inner: Arc::new(MarkerInner {
                id,
                line,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Marker id, or `None` once the marker has been disposed.
    pub fn id(&self) -> Option<MarkerId> {
        (!self.is_disposed()).then_some(self.inner.id)
    }

    /// The id this marker was created with, regardless of disposal.
    pub fn raw_id(&self) -> MarkerId {
        self.inner.id
    }

    /// Absolute line (0 = first line ever written).
    pub fn line(&self) -> usize {
        self.inner.line
    }

    /// Dispose the marker. Returns `true` if this call did the disposal.
    pub fn dispose(&self) -> bool {
        !self.inner.disposed.swap(true, Ordering::AcqRel)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles refer to the same marker.
    pub fn same_as(&self, other: &Marker) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marker")
            .field("id", &self.inner.id)
            .field("line", &self.inner.line)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_disappears_after_dispose() {
        let marker = Marker::new(4, 10);
        assert_eq!(marker.id(), Some(4));

        assert!(marker.dispose());
        assert!(!marker.dispose());
        assert_eq!(marker.id(), None);
        assert_eq!(marker.raw_id(), 4);
    }

    #[test]
    fn test_clones_share_disposal() {
        let marker = Marker::new(1, 0);
        let clone = marker.clone();
        clone.dispose();
        assert!(marker.is_disposed());
        assert!(marker.same_as(&clone));
        assert!(!marker.same_as(&Marker::new(1, 0)));
    }
}
