//! Scroll buffer line accounting and marker allocation.
//!
//! The buffer does not store cell contents; it only tracks how many lines
//! have been written and which lines are still retained, so that markers on
//! trimmed lines are disposed the way a real scrollback drops them.

use crate::marker::{Marker, MarkerId};
use std::collections::BTreeSet;

/// Line counter with a bounded scrollback that owns marker ids.
#[derive(Debug)]
pub struct ScrollbackBuffer {
    /// Maximum number of retained lines (scrollback + visible rows)
    max_lines: usize,
    /// Absolute number of lines written so far
    total_lines: usize,
    /// Live markers, in creation order
    markers: Vec<Marker>,
    /// Ids released by disposed markers, reused smallest first
    free_ids: BTreeSet<MarkerId>,
    next_id: MarkerId,
}

impl ScrollbackBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines: max_lines.max(1),
            total_lines: 0,
            markers: Vec::new(),
            free_ids: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Absolute line the cursor is on (where the next output lands).
    pub fn cursor_line(&self) -> usize {
        self.total_lines
    }

    /// Oldest absolute line still retained.
    pub fn first_retained_line(&self) -> usize {
        self.total_lines.saturating_sub(self.max_lines - 1)
    }

    /// Place a marker on the cursor line.
    pub fn register_marker(&mut self) -> Marker {
        self.reclaim_disposed();
        let id = match self.free_ids.pop_first() {
            Some(id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        let marker = Marker::new(id, self.total_lines);
        log::trace!("Registered marker {} at line {}", id, self.total_lines);
        self.markers.push(marker.clone());
        marker
    }

    /// Write `count` lines, disposing markers that scroll out of the buffer.
    ///
    /// Returns the markers disposed by this call.
    pub fn push_lines(&mut self, count: usize) -> Vec<Marker> {
        self.total_lines += count;
        let first = self.first_retained_line();

        let mut trimmed = Vec::new();
        self.markers.retain(|marker| {
            if marker.line() < first {
                marker.dispose();
                trimmed.push(marker.clone());
                false
            } else {
                true
            }
        });
        for marker in &trimmed {
            self.free_ids.insert(marker.raw_id());
        }
        if !trimmed.is_empty() {
            log::debug!(
                "Scrollback trim disposed {} marker(s) below line {}",
                trimmed.len(),
                first
            );
        }
        trimmed
    }

    /// Number of markers that are still alive.
    pub fn live_marker_count(&self) -> usize {
        self.markers.iter().filter(|m| !m.is_disposed()).count()
    }

    /// Dispose every marker (e.g. on clear-scrollback).
    pub fn clear(&mut self) {
        for marker in self.markers.drain(..) {
            marker.dispose();
            self.free_ids.insert(marker.raw_id());
        }
    }

    /// Release the ids of markers disposed by other owners.
    fn reclaim_disposed(&mut self) {
        let free_ids = &mut self.free_ids;
        self.markers.retain(|marker| {
            if marker.is_disposed() {
                free_ids.insert(marker.raw_id());
                false
            } else {
                true
            }
        });
    }
}
