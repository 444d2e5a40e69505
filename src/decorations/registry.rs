//! Per-marker bookkeeping of rendered command decorations.

use super::interaction::ElementListener;
use crate::error::RegistryError;
use serde::Serialize;
use std::collections::HashMap;
use term_decor_terminal::{Decoration, MarkerId, TerminalCommand};

/// Everything the addon owns for one decorated command.
#[derive(Debug)]
pub struct DecorationRecord {
    pub decoration: Decoration,
    pub command: TerminalCommand,
    /// Pointer listeners; empty for commands without an exit code
    pub disposables: Vec<ElementListener>,
    pub exit_code: Option<i32>,
}

impl DecorationRecord {
    pub fn new(
        decoration: Decoration,
        command: TerminalCommand,
        disposables: Vec<ElementListener>,
    ) -> Self {
        let exit_code = command.exit_code;
        Self {
            decoration,
            command,
            disposables,
            exit_code,
        }
    }

    /// Detach listeners and dispose the decoration, and its marker when
    /// `dispose_marker` is set. Safe to call on partly disposed records.
    pub fn dispose(&mut self, dispose_marker: bool) {
        for listener in &mut self.disposables {
            listener.dispose();
        }
        self.disposables.clear();
        self.decoration.dispose();
        if dispose_marker {
            self.decoration.marker().dispose();
        }
    }

    pub fn is_marker_alive(&self) -> bool {
        !self.decoration.marker().is_disposed()
    }
}

/// Serializable view of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecorationSnapshot {
    pub marker_id: MarkerId,
    pub line: usize,
    pub command: String,
    pub exit_code: Option<i32>,
    pub rendered: bool,
    pub classes: Vec<String>,
    pub listeners: usize,
}

impl DecorationSnapshot {
    pub fn from_record(marker_id: MarkerId, record: &DecorationRecord) -> Self {
        let element = record.decoration.element();
        Self {
            marker_id,
            line: record.decoration.marker().line(),
            command: record.command.command.clone(),
            exit_code: record.exit_code,
            rendered: element.is_some(),
            classes: element.map(|e| e.classes()).unwrap_or_default(),
            listeners: record.disposables.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DecorationRegistry {
    records: HashMap<MarkerId, DecorationRecord>,
}

impl DecorationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` under `id`.
    ///
    /// Fails when the existing record's marker is still alive; the refused
    /// record is disposed, leaving the shared marker alone. A stale record,
    /// whose marker was disposed and whose id was reused, is disposed and
    /// replaced.
    pub fn insert(
        &mut self,
        id: MarkerId,
        mut record: DecorationRecord,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.records.get_mut(&id) {
            if existing.is_marker_alive() {
                record.dispose(false);
                return Err(RegistryError::MarkerInUse(id));
            }
            log::debug!("Replacing stale decoration record for marker {}", id);
            existing.dispose(false);
        }
        self.records.insert(id, record);
        Ok(())
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<DecorationRecord> {
        self.records.remove(&id)
    }

    pub fn get(&self, id: MarkerId) -> Option<&DecorationRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MarkerId, &DecorationRecord)> {
        self.records.iter()
    }

    /// Marker ids in ascending order.
    pub fn ids(&self) -> Vec<MarkerId> {
        let mut ids: Vec<_> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Drop records whose marker scrolled out of the buffer. Returns the
    /// number of records removed.
    pub fn prune_disposed(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|id, record| {
            if record.is_marker_alive() {
                return true;
            }
            log::trace!("Pruning decoration record for scrolled-out marker {}", id);
            record.dispose(false);
            false
        });
        before - self.records.len()
    }

    /// Dispose and drop every record.
    pub fn clear(&mut self, dispose_markers: bool) {
        for (_, mut record) in self.records.drain() {
            record.dispose(dispose_markers);
        }
    }

    /// Snapshots ordered by marker id.
    pub fn snapshot(&self) -> Vec<DecorationSnapshot> {
        self.ids()
            .into_iter()
            .filter_map(|id| {
                self.records
                    .get(&id)
                    .map(|record| DecorationSnapshot::from_record(id, record))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use term_decor_terminal::Marker;

    fn record(marker: &Marker, exit_code: i32) -> DecorationRecord {
        let command = TerminalCommand::new("true", Some(marker.clone())).with_exit_code(exit_code);
        DecorationRecord::new(Decoration::new(marker.clone()), command, Vec::new())
    }

    #[test]
    fn test_refuses_live_overwrite() {
        let mut registry = DecorationRegistry::new();
        let marker = Marker::new(3, 0);
        registry.insert(3, record(&marker, 0)).expect("first insert");

        let refused = record(&marker, 1);
        let refused_decoration = refused.decoration.clone();
        let err = registry.insert(3, refused).unwrap_err();
        assert_eq!(err, RegistryError::MarkerInUse(3));
        assert_eq!(registry.get(3).and_then(|r| r.exit_code), Some(0));
        assert!(refused_decoration.is_disposed());
        assert!(!marker.is_disposed());
        assert!(registry.get(3).is_some_and(|r| !r.decoration.is_disposed()));
    }

    #[test]
    fn test_replaces_stale_entry() {
        let mut registry = DecorationRegistry::new();
        let old_marker = Marker::new(3, 0);
        registry.insert(3, record(&old_marker, 0)).expect("insert");
        let old = registry.get(3).map(|r| r.decoration.clone()).expect("record");
        old_marker.dispose();

        let new_marker = Marker::new(3, 50);
        registry.insert(3, record(&new_marker, 1)).expect("replace");
        assert!(old.is_disposed());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(3).map(|r| r.decoration.marker().line()), Some(50));
    }

    #[test]
    fn test_prune_disposed() {
        let mut registry = DecorationRegistry::new();
        let gone = Marker::new(0, 0);
        let alive = Marker::new(1, 10);
        registry.insert(0, record(&gone, 0)).expect("insert");
        registry.insert(1, record(&alive, 0)).expect("insert");
        gone.dispose();

        assert_eq!(registry.prune_disposed(), 1);
        assert_eq!(registry.ids(), vec![1]);
    }

    #[test]
    fn test_clear_disposes_markers_when_asked() {
        let mut registry = DecorationRegistry::new();
        let marker = Marker::new(0, 0);
        registry.insert(0, record(&marker, 2)).expect("insert");

        registry.clear(true);
        assert!(registry.is_empty());
        assert!(marker.is_disposed());
    }

    #[test]
    fn test_snapshot_sorted() {
        let mut registry = DecorationRegistry::new();
        for id in [5, 1, 3] {
            registry.insert(id, record(&Marker::new(id, id as usize), 0)).expect("insert");
        }
        let ids: Vec<_> = registry.snapshot().iter().map(|s| s.marker_id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert!(!registry.snapshot()[0].rendered);
    }
}
