//! Cancellable delayed trigger for hovers.
//!
//! The delayer never fires on its own; the owner polls it with the current
//! time from its event loop, so a trigger cancelled before its deadline can
//! never fire.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct HoverDelayer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> HoverDelayer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay. A pending task keeps its original deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `task` to fire `delay` after `now`, superseding any pending
    /// task.
    pub fn trigger(&mut self, now: Instant, task: T) {
        if self.pending.is_some() {
            log::trace!("Hover trigger superseded a pending hover");
        }
        self.pending = Some((now + self.delay, task));
    }

    /// Drop the pending task. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending task becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the pending task if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, task)| task),
            _ => None,
        }
    }
}
