//! Transient per-record feedback messages.
//!
//! Every save attempt posts one — success, failure, or informational no-op.
//! Messages are advisory, never persisted, and expire after a fixed interval.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::ids::LocalId;

/// How long a feedback message stays visible.
pub const FEEDBACK_TTL_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Failure,
    Info,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl Feedback {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::milliseconds(FEEDBACK_TTL_MS)
    }
}

/// Latest feedback per record; a new message replaces the previous one.
#[derive(Debug, Default)]
pub struct FeedbackBoard {
    entries: HashMap<LocalId, Feedback>,
}

impl FeedbackBoard {
    pub fn post(&mut self, id: LocalId, kind: FeedbackKind, message: impl Into<String>) {
        self.entries.insert(
            id,
            Feedback {
                kind,
                message: message.into(),
                issued_at: Utc::now(),
            },
        );
    }

    /// The record's feedback, if it has not expired.
    pub fn active(&self, id: LocalId, now: DateTime<Utc>) -> Option<&Feedback> {
        self.entries.get(&id).filter(|f| !f.is_expired(now))
    }

    /// Drops expired messages.
    pub fn sweep(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, f| !f.is_expired(now));
    }

    pub fn clear(&mut self, id: LocalId) {
        self.entries.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_feedback_is_active() {
        let mut board = FeedbackBoard::default();
        let id = LocalId::new();
        board.post(id, FeedbackKind::Success, "saved");
        let now = Utc::now();
        assert!(board.active(id, now).is_some());
    }

    #[test]
    fn test_feedback_expires_after_ttl() {
        let mut board = FeedbackBoard::default();
        let id = LocalId::new();
        board.post(id, FeedbackKind::Failure, "could not save");
        let later = Utc::now() + Duration::milliseconds(FEEDBACK_TTL_MS + 1);
        assert!(board.active(id, later).is_none());
    }

    #[test]
    fn test_sweep_drops_expired_entries() {
        let mut board = FeedbackBoard::default();
        let id = LocalId::new();
        board.post(id, FeedbackKind::Info, "no changes");
        board.sweep(Utc::now() + Duration::milliseconds(FEEDBACK_TTL_MS + 1));
        assert!(board.active(id, Utc::now()).is_none());
    }

    #[test]
    fn test_newer_message_replaces_older() {
        let mut board = FeedbackBoard::default();
        let id = LocalId::new();
        board.post(id, FeedbackKind::Failure, "could not save");
        board.post(id, FeedbackKind::Success, "saved");
        let active = board.active(id, Utc::now()).unwrap();
        assert_eq!(active.kind, FeedbackKind::Success);
    }
}
