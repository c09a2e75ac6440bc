//! Section save controller.
//!
//! One state machine per record: Clean → Dirty → Saving → Clean (success) or
//! Dirty (failure), with a transient feedback message posted on every
//! attempt. The decision policy, evaluated in order:
//!
//! 1. server id + disabled + no other pending changes → delete request
//! 2. not dirty + server id → no-op, no network call
//! 3. no identity field + no server id → refuse (empty new row)
//! 4. server id + dirty → update with only the diffed fields
//! 5. else → create; merge the server-issued id into record and snapshot
//!
//! Local validation errors block all of the above. Collaborator failures are
//! caught here and surfaced as feedback — `save` never returns an error, so
//! one section's failure cannot take down the session.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::SessionContext;
use crate::editing::feedback::{FeedbackBoard, FeedbackKind};
use crate::editing::tracker::{FieldMap, SnapshotStore, Tracked};
use crate::editing::validation::ValidationErrors;
use crate::models::ids::{LocalId, ServerId};
use crate::store::{RecordKind, RecordStore};

/// Result of a single save attempt. Informational variants are not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Created(ServerId),
    Updated,
    Deleted,
    /// Clean record with a server id; no network call issued.
    NoChanges,
    /// New row with an empty identity field; no network call issued.
    RefusedEmpty,
    /// Outstanding local validation errors; no network call issued.
    Blocked,
    /// A save for this record is already in flight.
    InFlight,
    Failed(String),
}

/// Aggregate result of a bulk save; partial success is expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSaveReport {
    pub saved: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Server ids whose local records were removed but whose delete call has not
/// yet succeeded. An id leaves the queue only on delete success.
#[derive(Debug, Default)]
pub struct DeletionQueue {
    pending: Vec<(RecordKind, ServerId)>,
}

impl DeletionQueue {
    pub fn request(&mut self, kind: RecordKind, id: ServerId) {
        if !self.pending.iter().any(|(k, i)| *k == kind && *i == id) {
            self.pending.push((kind, id));
        }
    }

    pub fn resolve(&mut self, kind: RecordKind, id: &ServerId) {
        self.pending.retain(|(k, i)| !(*k == kind && i == id));
    }

    pub fn pending(&self) -> &[(RecordKind, ServerId)] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Mutable editing state shared by every section: snapshots, field errors,
/// feedback, and the deletion queue.
#[derive(Debug, Default)]
pub struct EditingState {
    pub snapshots: SnapshotStore,
    pub validation: ValidationErrors,
    pub feedback: FeedbackBoard,
    pub deletions: DeletionQueue,
}

/// The network call a bulk save planned for one record.
enum Planned {
    Delete(ServerId),
    Update(ServerId, FieldMap),
    Create(FieldMap),
}

enum CallResult {
    Deleted(ServerId),
    Updated,
    Created(ServerId),
    Failed(String),
}

pub struct SectionSaver {
    store: Arc<dyn RecordStore>,
    ctx: SessionContext,
    in_flight: HashSet<LocalId>,
}

impl SectionSaver {
    pub fn new(store: Arc<dyn RecordStore>, ctx: SessionContext) -> Self {
        Self {
            store,
            ctx,
            in_flight: HashSet::new(),
        }
    }

    pub fn is_in_flight(&self, id: LocalId) -> bool {
        self.in_flight.contains(&id)
    }

    #[cfg(test)]
    fn force_in_flight(&mut self, id: LocalId) {
        self.in_flight.insert(id);
    }

    /// Saves one record. Never returns an error; failures become feedback.
    pub async fn save<E: Tracked>(&mut self, record: &mut E, state: &mut EditingState) -> SaveOutcome {
        let id = record.local_id();
        if self.in_flight.contains(&id) {
            return SaveOutcome::InFlight;
        }

        let errors = record.validate();
        if !errors.is_empty() {
            state.validation.set(id, errors);
            state
                .feedback
                .post(id, FeedbackKind::Failure, "fix the highlighted fields first");
            return SaveOutcome::Blocked;
        }
        state.validation.clear(id);

        let kind = record.kind();
        let dirty = state.snapshots.is_dirty(record);
        let diff = state.snapshots.diff(record);

        // 1. delete-on-disable
        if let Some(server_id) = record.server_id().cloned() {
            if !record.enabled() && diff.is_empty() {
                state.deletions.request(kind, server_id.clone());
                self.in_flight.insert(id);
                let result = self.store.delete(&self.ctx, kind, &server_id).await;
                self.in_flight.remove(&id);
                return match result {
                    Ok(()) => {
                        info!(kind = ?kind, %server_id, "record deleted");
                        state.deletions.resolve(kind, &server_id);
                        record.clear_fields();
                        record.set_server_id(None);
                        state.snapshots.capture(record);
                        state.feedback.post(id, FeedbackKind::Success, "removed");
                        SaveOutcome::Deleted
                    }
                    Err(e) => {
                        warn!(kind = ?kind, %server_id, "delete failed: {e:#}");
                        state
                            .feedback
                            .post(id, FeedbackKind::Failure, "could not remove");
                        SaveOutcome::Failed(e.to_string())
                    }
                };
            }
        }

        // 2. clean and already persisted
        if !dirty && record.server_id().is_some() {
            state
                .feedback
                .post(id, FeedbackKind::Info, "no changes to save");
            return SaveOutcome::NoChanges;
        }

        // 3. empty new row
        if record.server_id().is_none() && !record.has_identity() {
            state
                .feedback
                .post(id, FeedbackKind::Info, "nothing to save yet");
            return SaveOutcome::RefusedEmpty;
        }

        self.in_flight.insert(id);
        let outcome = if let Some(server_id) = record.server_id().cloned() {
            // 4. persisted and dirty: minimal-diff update
            debug!(kind = ?kind, %server_id, fields = diff.len(), "updating record");
            match self.store.update(&self.ctx, kind, &server_id, &diff).await {
                Ok(()) => {
                    state.snapshots.capture(record);
                    state.feedback.post(id, FeedbackKind::Success, "saved");
                    SaveOutcome::Updated
                }
                Err(e) => {
                    warn!(kind = ?kind, %server_id, "update failed: {e:#}");
                    state
                        .feedback
                        .post(id, FeedbackKind::Failure, "could not save");
                    SaveOutcome::Failed(e.to_string())
                }
            }
        } else {
            // 5. new record with identity: create, then merge the server id
            match self.store.create(&self.ctx, kind, &record.field_map()).await {
                Ok(server_id) => {
                    info!(kind = ?kind, %server_id, "record created");
                    record.set_server_id(Some(server_id.clone()));
                    state.snapshots.capture(record);
                    state.feedback.post(id, FeedbackKind::Success, "saved");
                    SaveOutcome::Created(server_id)
                }
                Err(e) => {
                    warn!(kind = ?kind, "create failed: {e:#}");
                    state
                        .feedback
                        .post(id, FeedbackKind::Failure, "could not save");
                    SaveOutcome::Failed(e.to_string())
                }
            }
        };
        self.in_flight.remove(&id);
        outcome
    }

    /// Saves every record of a section concurrently and independently; one
    /// failure neither blocks nor rolls back the others.
    ///
    /// Calls are planned synchronously, issued in parallel, then reconciled
    /// by local id — a response whose record was removed in the meantime is
    /// dropped on the floor.
    pub async fn save_all<E: Tracked>(
        &mut self,
        records: &mut Vec<E>,
        state: &mut EditingState,
    ) -> BulkSaveReport {
        let mut report = BulkSaveReport::default();
        let mut calls: JoinSet<(LocalId, CallResult)> = JoinSet::new();

        for record in records.iter() {
            let id = record.local_id();
            if self.in_flight.contains(&id) {
                report.skipped += 1;
                continue;
            }
            let errors = record.validate();
            if !errors.is_empty() {
                state.validation.set(id, errors);
                state
                    .feedback
                    .post(id, FeedbackKind::Failure, "fix the highlighted fields first");
                report.skipped += 1;
                continue;
            }
            state.validation.clear(id);

            let kind = record.kind();
            let dirty = state.snapshots.is_dirty(record);
            let diff = state.snapshots.diff(record);

            let planned = if let Some(server_id) = record.server_id().cloned() {
                if !record.enabled() && diff.is_empty() {
                    state.deletions.request(kind, server_id.clone());
                    Planned::Delete(server_id)
                } else if !dirty {
                    state
                        .feedback
                        .post(id, FeedbackKind::Info, "no changes to save");
                    report.skipped += 1;
                    continue;
                } else {
                    Planned::Update(server_id, diff)
                }
            } else if !record.has_identity() {
                state
                    .feedback
                    .post(id, FeedbackKind::Info, "nothing to save yet");
                report.skipped += 1;
                continue;
            } else {
                Planned::Create(record.field_map())
            };

            self.in_flight.insert(id);
            let store = Arc::clone(&self.store);
            let ctx = self.ctx.clone();
            calls.spawn(async move {
                let result = match planned {
                    Planned::Delete(server_id) => match store.delete(&ctx, kind, &server_id).await
                    {
                        Ok(()) => CallResult::Deleted(server_id),
                        Err(e) => CallResult::Failed(e.to_string()),
                    },
                    Planned::Update(server_id, patch) => {
                        match store.update(&ctx, kind, &server_id, &patch).await {
                            Ok(()) => CallResult::Updated,
                            Err(e) => CallResult::Failed(e.to_string()),
                        }
                    }
                    Planned::Create(payload) => match store.create(&ctx, kind, &payload).await {
                        Ok(server_id) => CallResult::Created(server_id),
                        Err(e) => CallResult::Failed(e.to_string()),
                    },
                };
                (id, result)
            });
        }

        while let Some(joined) = calls.join_next().await {
            let Ok((id, result)) = joined else {
                report.failed += 1;
                continue;
            };
            self.in_flight.remove(&id);

            // Reconcile by local id; no-op if the record no longer exists.
            let Some(record) = records.iter_mut().find(|r| r.local_id() == id) else {
                report.skipped += 1;
                continue;
            };
            match result {
                CallResult::Deleted(server_id) => {
                    state.deletions.resolve(record.kind(), &server_id);
                    record.clear_fields();
                    record.set_server_id(None);
                    state.snapshots.capture(record);
                    state.feedback.post(id, FeedbackKind::Success, "removed");
                    report.saved += 1;
                }
                CallResult::Updated => {
                    state.snapshots.capture(record);
                    state.feedback.post(id, FeedbackKind::Success, "saved");
                    report.saved += 1;
                }
                CallResult::Created(server_id) => {
                    record.set_server_id(Some(server_id));
                    state.snapshots.capture(record);
                    state.feedback.post(id, FeedbackKind::Success, "saved");
                    report.saved += 1;
                }
                CallResult::Failed(message) => {
                    warn!(%id, "bulk save item failed: {message}");
                    state
                        .feedback
                        .post(id, FeedbackKind::Failure, "could not save");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Retries every queued delete; ids stay queued until their call succeeds.
    pub async fn flush_deletions(&mut self, state: &mut EditingState) -> BulkSaveReport {
        let mut report = BulkSaveReport::default();
        let mut calls: JoinSet<(RecordKind, ServerId, Result<(), String>)> = JoinSet::new();

        for (kind, server_id) in state.deletions.pending().to_vec() {
            let store = Arc::clone(&self.store);
            let ctx = self.ctx.clone();
            calls.spawn(async move {
                let result = store
                    .delete(&ctx, kind, &server_id)
                    .await
                    .map_err(|e| e.to_string());
                (kind, server_id, result)
            });
        }

        while let Some(joined) = calls.join_next().await {
            let Ok((kind, server_id, result)) = joined else {
                report.failed += 1;
                continue;
            };
            match result {
                Ok(()) => {
                    state.deletions.resolve(kind, &server_id);
                    report.saved += 1;
                }
                Err(message) => {
                    warn!(kind = ?kind, %server_id, "queued delete failed: {message}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Skill;
    use crate::store::RecordKind;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    fn ctx() -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            token: "test-token".to_string(),
        }
    }

    /// In-memory collaborator that records every call.
    #[derive(Default)]
    struct MockStore {
        next_id: AtomicU32,
        fail: AtomicBool,
        creates: AtomicU32,
        updates: AtomicU32,
        deletes: AtomicU32,
        last_patch: Mutex<Option<FieldMap>>,
    }

    impl MockStore {
        fn failing() -> Self {
            let store = Self::default();
            store.fail.store(true, Ordering::SeqCst);
            store
        }
    }

    #[async_trait]
    impl RecordStore for MockStore {
        async fn fetch(&self, _ctx: &SessionContext, _kind: RecordKind) -> Result<Vec<Value>> {
            Ok(vec![])
        }
        async fn create(
            &self,
            _ctx: &SessionContext,
            _kind: RecordKind,
            _payload: &FieldMap,
        ) -> Result<ServerId> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("boom"));
            }
            self.creates.fetch_add(1, Ordering::SeqCst);
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 42;
            Ok(ServerId::new(n.to_string()))
        }
        async fn update(
            &self,
            _ctx: &SessionContext,
            _kind: RecordKind,
            _id: &ServerId,
            patch: &FieldMap,
        ) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("boom"));
            }
            self.updates.fetch_add(1, Ordering::SeqCst);
            *self.last_patch.lock().unwrap() = Some(patch.clone());
            Ok(())
        }
        async fn delete(
            &self,
            _ctx: &SessionContext,
            _kind: RecordKind,
            _id: &ServerId,
        ) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("boom"));
            }
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn saver_with(store: Arc<MockStore>) -> SectionSaver {
        SectionSaver::new(store, ctx())
    }

    #[tokio::test]
    async fn test_new_empty_row_is_refused_without_network() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();
        let mut skill = Skill::new();

        assert!(!state.snapshots.is_dirty(&skill));
        assert_eq!(
            saver.save(&mut skill, &mut state).await,
            SaveOutcome::RefusedEmpty
        );
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_merges_server_id_and_refreshes_snapshot() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        // the lifecycle: blank row → clean; titled → dirty; saved → clean with id
        let mut skill = Skill::new();
        skill.title = "X".into();
        assert!(state.snapshots.is_dirty(&skill));

        let outcome = saver.save(&mut skill, &mut state).await;
        assert_eq!(outcome, SaveOutcome::Created(ServerId::new("42")));
        assert_eq!(skill.server_id, Some(ServerId::new("42")));
        assert!(!state.snapshots.is_dirty(&skill));
    }

    #[tokio::test]
    async fn test_update_sends_only_the_diffed_fields() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut skill = Skill::new();
        skill.server_id = Some(ServerId::new("7"));
        skill.title = "A".into();
        skill.category = "language".into();
        state.snapshots.capture(&skill);

        skill.title = "B".into();
        assert_eq!(saver.save(&mut skill, &mut state).await, SaveOutcome::Updated);

        let patch = store.last_patch.lock().unwrap().clone().unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get("title"), Some(&json!("B")));
        assert!(!state.snapshots.is_dirty(&skill));
    }

    #[tokio::test]
    async fn test_clean_persisted_record_is_a_noop() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut skill = Skill::new();
        skill.server_id = Some(ServerId::new("7"));
        skill.title = "A".into();
        state.snapshots.capture(&skill);

        assert_eq!(
            saver.save(&mut skill, &mut state).await,
            SaveOutcome::NoChanges
        );
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_on_disable_clears_record_and_server_id() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut cert = crate::models::document::Certification::new();
        cert.server_id = Some(ServerId::new("9"));
        cert.name = "AWS SAA".into();
        state.snapshots.capture(&cert);

        cert.enabled = false;
        assert_eq!(saver.save(&mut cert, &mut state).await, SaveOutcome::Deleted);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert!(cert.name.is_empty());
        assert!(cert.server_id.is_none());
        assert!(!state.snapshots.is_dirty(&cert));
        assert!(state.deletions.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_but_dirty_record_updates_instead_of_deleting() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut cert = crate::models::document::Certification::new();
        cert.server_id = Some(ServerId::new("9"));
        cert.name = "AWS SAA".into();
        state.snapshots.capture(&cert);

        cert.enabled = false;
        cert.issuer = "Amazon".into(); // pending field change → not a delete
        assert_eq!(saver.save(&mut cert, &mut state).await, SaveOutcome::Updated);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_record_dirty_and_unchanged() {
        let store = Arc::new(MockStore::failing());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut skill = Skill::new();
        skill.server_id = Some(ServerId::new("7"));
        skill.title = "A".into();
        state.snapshots.capture(&skill);
        skill.title = "B".into();

        let outcome = saver.save(&mut skill, &mut state).await;
        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert_eq!(skill.title, "B");
        assert!(state.snapshots.is_dirty(&skill));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_id_queued_until_flush_succeeds() {
        let store = Arc::new(MockStore::failing());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut cert = crate::models::document::Certification::new();
        cert.server_id = Some(ServerId::new("9"));
        cert.name = "AWS SAA".into();
        state.snapshots.capture(&cert);
        cert.enabled = false;

        assert!(matches!(
            saver.save(&mut cert, &mut state).await,
            SaveOutcome::Failed(_)
        ));
        assert_eq!(state.deletions.pending().len(), 1);

        // collaborator recovers; finalize flush drains the queue
        store.fail.store(false, Ordering::SeqCst);
        let report = saver.flush_deletions(&mut state).await;
        assert_eq!(report.saved, 1);
        assert!(state.deletions.is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors_block_save() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut personal = crate::models::document::PersonalInfo::default();
        personal.first_name = "Asha".into();
        personal.email = "not-an-email".into();

        assert_eq!(
            saver.save(&mut personal, &mut state).await,
            SaveOutcome::Blocked
        );
        assert!(state.validation.has_errors(personal.local_id));
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);

        // correcting the field clears the block
        personal.email = "asha@example.com".into();
        assert!(matches!(
            saver.save(&mut personal, &mut state).await,
            SaveOutcome::Created(_)
        ));
        assert!(!state.validation.has_errors(personal.local_id));
    }

    #[tokio::test]
    async fn test_in_flight_guard_rejects_double_submit() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut skill = Skill::new();
        skill.title = "X".into();
        saver.force_in_flight(skill.local_id);
        assert_eq!(
            saver.save(&mut skill, &mut state).await,
            SaveOutcome::InFlight
        );
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bulk_save_reports_partial_results() {
        let store = Arc::new(MockStore::default());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut clean = Skill::new();
        clean.server_id = Some(ServerId::new("1"));
        clean.title = "Rust".into();
        state.snapshots.capture(&clean);

        let mut dirty = Skill::new();
        dirty.server_id = Some(ServerId::new("2"));
        dirty.title = "Go".into();
        state.snapshots.capture(&dirty);
        dirty.proficiency = "advanced".into();

        let mut fresh = Skill::new();
        fresh.title = "SQL".into();

        let empty = Skill::new();

        let mut skills = vec![clean, dirty, fresh, empty];
        let report = saver.save_all(&mut skills, &mut state).await;

        assert_eq!(report.saved, 2); // one update + one create
        assert_eq!(report.skipped, 2); // clean + empty
        assert_eq!(report.failed, 0);
        assert!(skills[2].server_id.is_some());
        for skill in &skills {
            assert!(!saver.is_in_flight(skill.local_id));
        }
    }

    #[tokio::test]
    async fn test_bulk_save_failure_does_not_block_others() {
        let store = Arc::new(MockStore::failing());
        let mut saver = saver_with(Arc::clone(&store));
        let mut state = EditingState::default();

        let mut a = Skill::new();
        a.title = "Rust".into();
        let mut b = Skill::new();
        b.title = "Go".into();

        let mut skills = vec![a, b];
        let report = saver.save_all(&mut skills, &mut state).await;
        assert_eq!(report.failed, 2);
        assert!(skills.iter().all(|s| s.server_id.is_none()));
        // both are still dirty and retryable
        assert!(skills.iter().all(|s| state.snapshots.is_dirty(s)));
    }
}
