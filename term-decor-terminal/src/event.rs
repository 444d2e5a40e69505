//! Event streams with disposable subscriptions.
//!
//! An [`Emitter`] fans each fired value out to every live [`Subscription`].
//! Subscribers do not run callbacks; values are queued and drained by the
//! owner on its next pump, in the same way `MarkerTracker::drain_events`
//! hands shell lifecycle events to the frame loop.
//!
//! Every fired value is stamped with a process-wide sequence number so that
//! a consumer draining several subscriptions can merge them back into firing
//! order.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_seq() -> u64 {
    NEXT_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// A value delivered through a subscription, tagged with its firing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    /// Global firing order. Smaller fired earlier.
    pub seq: u64,
    pub value: T,
}

type Queue<T> = Mutex<VecDeque<Sequenced<T>>>;

/// Fan-out event source.
pub struct Emitter<T> {
    listeners: Mutex<Vec<Weak<Queue<T>>>>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T: Clone> Emitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new listener. Only values fired after this call are delivered.
    pub fn subscribe(&self) -> Subscription<T> {
        let queue: Arc<Queue<T>> = Arc::new(Mutex::new(VecDeque::new()));
        self.listeners.lock().push(Arc::downgrade(&queue));
        Subscription { queue: Some(queue) }
    }

    /// Attach a new listener and queue `seed` for it alone.
    ///
    /// Used for one-shot streams whose value may already exist when the
    /// listener attaches (e.g. a decoration that rendered before anyone
    /// asked for its render callback).
    pub fn subscribe_seeded(&self, seed: Option<T>) -> Subscription<T> {
        let subscription = self.subscribe();
        if let (Some(value), Some(queue)) = (seed, subscription.queue.as_ref()) {
            queue.lock().push_back(Sequenced {
                seq: next_seq(),
                value,
            });
        }
        subscription
    }

    /// Deliver `value` to every live listener, pruning disposed ones.
    pub fn fire(&self, value: T) {
        let seq = next_seq();
        self.listeners.lock().retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.lock().push_back(Sequenced {
                    seq,
                    value: value.clone(),
                });
                true
            }
            None => false,
        });
    }

    /// Detach every listener. Existing subscriptions stop receiving values.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }
}

impl<T> Emitter<T> {
    /// Number of listeners that are still attached.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Handle to a listener on an [`Emitter`].
///
/// Dropping or disposing the subscription detaches it. Disposal is
/// idempotent.
pub struct Subscription<T> {
    queue: Option<Arc<Queue<T>>>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl<T> Subscription<T> {
    /// Take every queued value, oldest first. Empty once disposed.
    pub fn drain(&self) -> Vec<Sequenced<T>> {
        match &self.queue {
            Some(queue) => queue.lock().drain(..).collect(),
            None => Vec::new(),
        }
    }

    /// Number of values waiting to be drained.
    pub fn pending(&self) -> usize {
        self.queue.as_ref().map_or(0, |queue| queue.lock().len())
    }

    /// Detach from the emitter and discard queued values.
    pub fn dispose(&mut self) {
        self.queue = None;
    }

    pub fn is_active(&self) -> bool {
        self.queue.is_some()
    }
}
