//! Entity dirty tracking.
//!
//! One generic comparison engine serves every section instead of each form
//! re-deriving its own. A record exposes its user-editable fields as a flat
//! `FieldMap` keyed by the collaborator's external field names, so the same
//! map drives dirtiness checks, minimal-diff PATCH bodies, and snapshot
//! restore. Identifiers and transient UI flags never appear in the map.
//!
//! Snapshots live in a side map keyed by local id — never inside the record
//! itself, so the record can be compared without feeding back into the
//! comparison subject.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::editing::validation::FieldError;
use crate::models::ids::{LocalId, ServerId};
use crate::store::RecordKind;

/// Editable fields under external API naming. Doubles as a partial PATCH body.
pub type FieldMap = BTreeMap<String, Value>;

/// A record the dirty tracker and save controller can operate on.
pub trait Tracked {
    fn local_id(&self) -> LocalId;

    fn server_id(&self) -> Option<&ServerId>;

    fn set_server_id(&mut self, id: Option<ServerId>);

    /// Which collaborator endpoint family persists this record.
    fn kind(&self) -> RecordKind;

    /// True when the field that names this record (title/name/...) is filled.
    fn has_identity(&self) -> bool;

    /// Records with a disable toggle return false when toggled off; saving a
    /// disabled, otherwise-unchanged record is treated as a delete request.
    fn enabled(&self) -> bool {
        true
    }

    /// User-editable fields, external naming. Ids and UI flags excluded.
    fn field_map(&self) -> FieldMap;

    /// Writes a field map back into the editable fields. Unknown keys are
    /// ignored; identifiers are untouched.
    fn apply_field_map(&mut self, fields: &FieldMap);

    /// Resets every editable field to its empty default (after a delete).
    fn clear_fields(&mut self);

    /// Local format validation. Empty means the record may be saved.
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

/// Side map of last-synced snapshots, keyed by local id.
///
/// A snapshot is captured when a record first appears (load or creation) and
/// refreshed after every successful save. No network effects.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<LocalId, FieldMap>,
}

impl SnapshotStore {
    pub fn capture<E: Tracked + ?Sized>(&mut self, record: &E) {
        self.snapshots.insert(record.local_id(), record.field_map());
    }

    pub fn has_snapshot(&self, id: LocalId) -> bool {
        self.snapshots.contains_key(&id)
    }

    /// A record with no snapshot is dirty iff its identity field is filled,
    /// so a freshly added, still-empty row never flags unsaved work.
    pub fn is_dirty<E: Tracked + ?Sized>(&self, record: &E) -> bool {
        match self.snapshots.get(&record.local_id()) {
            Some(snapshot) => *snapshot != record.field_map(),
            None => record.has_identity(),
        }
    }

    /// Exactly the fields whose current value differs from the snapshot.
    /// With no snapshot, every field counts as changed.
    pub fn diff<E: Tracked + ?Sized>(&self, record: &E) -> FieldMap {
        let current = record.field_map();
        match self.snapshots.get(&record.local_id()) {
            Some(snapshot) => current
                .into_iter()
                .filter(|(key, value)| snapshot.get(key) != Some(value))
                .collect(),
            None => current,
        }
    }

    /// Restores the editable fields from the snapshot, identifiers untouched.
    /// Returns false (and leaves the record alone) if no snapshot exists.
    pub fn reset<E: Tracked + ?Sized>(&self, record: &mut E) -> bool {
        match self.snapshots.get(&record.local_id()) {
            Some(snapshot) => {
                record.apply_field_map(snapshot);
                true
            }
            None => false,
        }
    }

    /// Drops the snapshot for a record removed from the document.
    pub fn forget(&mut self, id: LocalId) {
        self.snapshots.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal tracked record for exercising the generic tracker.
    #[derive(Debug, Clone, Default)]
    struct Note {
        local_id: LocalId,
        server_id: Option<ServerId>,
        title: String,
        body: String,
    }

    impl Tracked for Note {
        fn local_id(&self) -> LocalId {
            self.local_id
        }
        fn server_id(&self) -> Option<&ServerId> {
            self.server_id.as_ref()
        }
        fn set_server_id(&mut self, id: Option<ServerId>) {
            self.server_id = id;
        }
        fn kind(&self) -> RecordKind {
            RecordKind::Summary
        }
        fn has_identity(&self) -> bool {
            !self.title.trim().is_empty()
        }
        fn field_map(&self) -> FieldMap {
            FieldMap::from([
                ("title".to_string(), json!(self.title)),
                ("body".to_string(), json!(self.body)),
            ])
        }
        fn apply_field_map(&mut self, fields: &FieldMap) {
            if let Some(v) = fields.get("title").and_then(Value::as_str) {
                self.title = v.to_string();
            }
            if let Some(v) = fields.get("body").and_then(Value::as_str) {
                self.body = v.to_string();
            }
        }
        fn clear_fields(&mut self) {
            self.title.clear();
            self.body.clear();
        }
    }

    #[test]
    fn test_blank_new_record_is_not_dirty() {
        let store = SnapshotStore::default();
        let note = Note::default();
        assert!(!store.is_dirty(&note));
    }

    #[test]
    fn test_new_record_with_identity_is_dirty_without_snapshot() {
        let store = SnapshotStore::default();
        let note = Note {
            title: "X".into(),
            ..Note::default()
        };
        assert!(store.is_dirty(&note));
    }

    #[test]
    fn test_clean_after_capture_dirty_after_edit() {
        let mut store = SnapshotStore::default();
        let mut note = Note {
            title: "A".into(),
            body: "b".into(),
            ..Note::default()
        };
        store.capture(&note);
        assert!(!store.is_dirty(&note));

        note.title = "B".into();
        assert!(store.is_dirty(&note));
    }

    #[test]
    fn test_diff_contains_exactly_the_changed_fields() {
        let mut store = SnapshotStore::default();
        let mut note = Note {
            title: "A".into(),
            body: "same".into(),
            ..Note::default()
        };
        store.capture(&note);
        note.title = "B".into();

        let diff = store.diff(&note);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("title"), Some(&json!("B")));
    }

    #[test]
    fn test_diff_without_snapshot_is_full_map() {
        let store = SnapshotStore::default();
        let note = Note {
            title: "A".into(),
            ..Note::default()
        };
        assert_eq!(store.diff(&note).len(), 2);
    }

    #[test]
    fn test_reset_restores_fields_and_keeps_ids() {
        let mut store = SnapshotStore::default();
        let mut note = Note {
            server_id: Some(ServerId::new("7")),
            title: "A".into(),
            ..Note::default()
        };
        store.capture(&note);
        note.title = "B".into();

        assert!(store.reset(&mut note));
        assert_eq!(note.title, "A");
        assert_eq!(note.server_id, Some(ServerId::new("7")));
        assert!(!store.is_dirty(&note));
    }

    #[test]
    fn test_reset_without_snapshot_is_a_noop() {
        let store = SnapshotStore::default();
        let mut note = Note {
            title: "keep".into(),
            ..Note::default()
        };
        assert!(!store.reset(&mut note));
        assert_eq!(note.title, "keep");
    }

    #[test]
    fn test_forget_drops_the_snapshot() {
        let mut store = SnapshotStore::default();
        let note = Note {
            title: "A".into(),
            ..Note::default()
        };
        store.capture(&note);
        store.forget(note.local_id());
        assert!(!store.has_snapshot(note.local_id()));
        // back to the no-snapshot rule: identity filled → dirty
        assert!(store.is_dirty(&note));
    }
}
