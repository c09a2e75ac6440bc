//! Persistence collaborator boundary.
//!
//! The editor never talks to a database directly: every section is persisted
//! through a remote CRUD API reached via the `RecordStore` trait, and binary
//! assets (profile photo, certificate files) go through `AssetStore`. The
//! default implementations in `http` are thin `reqwest` wrappers; tests swap
//! in in-memory mocks.

pub mod http;

pub use http::{HttpAssetStore, HttpRecordStore};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SessionContext;
use crate::editing::tracker::FieldMap;
use crate::models::ids::ServerId;

/// The record kinds the collaborator exposes, one endpoint family each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Personal,
    Sslc,
    PreUniversity,
    HigherEducation,
    Experience,
    Project,
    Skill,
    Links,
    Languages,
    Summary,
    Certification,
}

impl RecordKind {
    pub const ALL: [RecordKind; 11] = [
        RecordKind::Personal,
        RecordKind::Sslc,
        RecordKind::PreUniversity,
        RecordKind::HigherEducation,
        RecordKind::Experience,
        RecordKind::Project,
        RecordKind::Skill,
        RecordKind::Links,
        RecordKind::Languages,
        RecordKind::Summary,
        RecordKind::Certification,
    ];

    /// URL path segment for this kind under the per-user resume API.
    pub fn path(&self) -> &'static str {
        match self {
            RecordKind::Personal => "personal",
            RecordKind::Sslc => "education/sslc",
            RecordKind::PreUniversity => "education/pu",
            RecordKind::HigherEducation => "education/higher",
            RecordKind::Experience => "experiences",
            RecordKind::Project => "projects",
            RecordKind::Skill => "skills",
            RecordKind::Links => "links",
            RecordKind::Languages => "languages",
            RecordKind::Summary => "summary",
            RecordKind::Certification => "certifications",
        }
    }

    /// Singleton kinds hold at most one record per user.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            RecordKind::Personal
                | RecordKind::Sslc
                | RecordKind::PreUniversity
                | RecordKind::Links
                | RecordKind::Languages
                | RecordKind::Summary
        )
    }
}

/// CRUD access to per-section resume records.
///
/// Contract (assumed of the remote API): `create` returns the new record's
/// server id; `update` accepts a partial object (only the changed fields);
/// `delete` is idempotent from the caller's perspective — deleting an
/// already-deleted id must not surface as an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch(&self, ctx: &SessionContext, kind: RecordKind) -> Result<Vec<Value>>;

    async fn create(
        &self,
        ctx: &SessionContext,
        kind: RecordKind,
        payload: &FieldMap,
    ) -> Result<ServerId>;

    async fn update(
        &self,
        ctx: &SessionContext,
        kind: RecordKind,
        id: &ServerId,
        patch: &FieldMap,
    ) -> Result<()>;

    async fn delete(&self, ctx: &SessionContext, kind: RecordKind, id: &ServerId) -> Result<()>;
}

/// Binary asset upload (photo, certificate files). Returns the public URL.
///
/// A failed upload must leave the document untouched; the caller only writes
/// the returned URL into the document after success.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(
        &self,
        ctx: &SessionContext,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String>;
}
