//! The editing session: single owner of the `ResumeDocument`, wiring the
//! wizard, dirty tracking, save controller, pagination and collaborators.
//!
//! Slice discipline: each form component works against exactly one slice of
//! the document and replaces it wholesale on write-back. Session identity
//! (`user_id`, token) is injected at construction.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::info;

use crate::config::SessionContext;
use crate::editing::save::{BulkSaveReport, EditingState, SaveOutcome, SectionSaver};
use crate::editing::tracker::Tracked;
use crate::errors::EditorError;
use crate::import;
use crate::models::document::{
    Certification, HigherEducation, Project, ResumeDocument, SchoolLevel, Skill, WorkExperience,
};
use crate::models::ids::LocalId;
use crate::preview::pagination::{default_page_config, LayoutSurface, PaginationEngine};
use crate::preview::template::{descriptor, TemplateDescriptor, TemplateId};
use crate::store::{AssetStore, RecordKind, RecordStore};
use crate::wizard::WizardController;

pub struct EditorSession {
    ctx: SessionContext,
    store: Arc<dyn RecordStore>,
    assets: Arc<dyn AssetStore>,
    pub document: ResumeDocument,
    pub editing: EditingState,
    pub wizard: WizardController,
    pub pagination: PaginationEngine,
    template: TemplateId,
    saver: SectionSaver,
}

impl EditorSession {
    pub fn new(
        ctx: SessionContext,
        store: Arc<dyn RecordStore>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            saver: SectionSaver::new(Arc::clone(&store), ctx.clone()),
            ctx,
            store,
            assets,
            document: ResumeDocument::default(),
            editing: EditingState::default(),
            wizard: WizardController::new(),
            pagination: PaginationEngine::new(default_page_config()),
            template: TemplateId::Classic,
        }
    }

    // ── Hydration ───────────────────────────────────────────────────────────

    /// Fetches every section from the collaborator and hydrates the document.
    /// Records arriving with server ids start Clean.
    pub async fn load(&mut self) -> Result<(), EditorError> {
        for kind in RecordKind::ALL {
            let records = self.store.fetch(&self.ctx, kind).await?;
            self.hydrate(kind, &records);
        }
        self.capture_all_snapshots();
        self.pagination.invalidate();
        info!(
            experiences = self.document.experience.len(),
            projects = self.document.projects.len(),
            skills = self.document.skills_links.skills.len(),
            certifications = self.document.certifications.len(),
            "resume document loaded"
        );
        Ok(())
    }

    fn hydrate(&mut self, kind: RecordKind, records: &[Value]) {
        let doc = &mut self.document;
        match kind {
            RecordKind::Personal => {
                if let Some(v) = records.first() {
                    doc.personal = import::personal_from_value(v);
                }
            }
            RecordKind::Sslc => {
                if let Some(v) = records.first() {
                    doc.education.sslc = import::school_from_value(SchoolLevel::Sslc, v);
                }
            }
            RecordKind::PreUniversity => {
                if let Some(v) = records.first() {
                    doc.education.pre_university =
                        import::school_from_value(SchoolLevel::PreUniversity, v);
                }
            }
            RecordKind::HigherEducation => {
                doc.education.higher = records
                    .iter()
                    .map(import::higher_education_from_value)
                    .collect();
            }
            RecordKind::Experience => {
                doc.experience = records.iter().map(import::experience_from_value).collect();
            }
            RecordKind::Project => {
                doc.projects = records.iter().map(import::project_from_value).collect();
            }
            RecordKind::Skill => {
                doc.skills_links.skills = records.iter().map(import::skill_from_value).collect();
            }
            RecordKind::Links => {
                if let Some(v) = records.first() {
                    doc.skills_links.links = import::links_from_value(v);
                }
            }
            RecordKind::Languages => {
                if let Some(v) = records.first() {
                    doc.skills_links.languages = import::languages_from_value(v);
                }
            }
            RecordKind::Summary => {
                if let Some(v) = records.first() {
                    doc.skills_links.summary = import::summary_from_value(v);
                }
            }
            RecordKind::Certification => {
                doc.certifications = records
                    .iter()
                    .map(import::certification_from_value)
                    .collect();
            }
        }
    }

    fn capture_all_snapshots(&mut self) {
        let doc = &self.document;
        let snapshots = &mut self.editing.snapshots;
        snapshots.capture(&doc.personal);
        snapshots.capture(&doc.education.sslc);
        snapshots.capture(&doc.education.pre_university);
        for row in &doc.education.higher {
            snapshots.capture(row);
        }
        for row in &doc.experience {
            snapshots.capture(row);
        }
        for row in &doc.projects {
            snapshots.capture(row);
        }
        for row in &doc.skills_links.skills {
            snapshots.capture(row);
        }
        snapshots.capture(&doc.skills_links.links);
        snapshots.capture(&doc.skills_links.summary);
        snapshots.capture(&doc.skills_links.languages);
        for row in &doc.certifications {
            snapshots.capture(row);
        }
    }

    /// Snapshots only records the server already knows about. Used after an
    /// import: fresh (never-saved) records stay dirty-by-identity so their
    /// content still counts as unsaved work.
    fn capture_synced_snapshots(&mut self) {
        let doc = &self.document;
        let snapshots = &mut self.editing.snapshots;
        let mut capture = |record: &dyn Tracked| {
            if record.server_id().is_some() {
                snapshots.capture(record);
            }
        };
        capture(&doc.personal);
        capture(&doc.education.sslc);
        capture(&doc.education.pre_university);
        for row in &doc.education.higher {
            capture(row);
        }
        for row in &doc.experience {
            capture(row);
        }
        for row in &doc.projects {
            capture(row);
        }
        for row in &doc.skills_links.skills {
            capture(row);
        }
        capture(&doc.skills_links.links);
        capture(&doc.skills_links.summary);
        capture(&doc.skills_links.languages);
        for row in &doc.certifications {
            capture(row);
        }
    }

    // ── Import ──────────────────────────────────────────────────────────────

    /// One-shot merge of an external resume payload (parsed upload or
    /// duplicated template). Supplied sections replace their slice wholesale.
    pub fn import(&mut self, payload: &Value) {
        import::merge_document(&mut self.document, payload);
        self.capture_synced_snapshots();
        self.pagination.invalidate();
    }

    // ── Row management ──────────────────────────────────────────────────────

    pub fn add_experience(&mut self) -> LocalId {
        let row = WorkExperience::new();
        let id = row.local_id;
        self.editing.snapshots.capture(&row);
        self.document.experience.push(row);
        id
    }

    pub fn add_project(&mut self) -> LocalId {
        let row = Project::new();
        let id = row.local_id;
        self.editing.snapshots.capture(&row);
        self.document.projects.push(row);
        id
    }

    pub fn add_skill(&mut self) -> LocalId {
        let row = Skill::new();
        let id = row.local_id;
        self.editing.snapshots.capture(&row);
        self.document.skills_links.skills.push(row);
        id
    }

    pub fn add_higher_education(&mut self) -> LocalId {
        let row = HigherEducation::new();
        let id = row.local_id;
        self.editing.snapshots.capture(&row);
        self.document.education.higher.push(row);
        id
    }

    pub fn add_certification(&mut self) -> LocalId {
        let row = Certification::new();
        let id = row.local_id;
        self.editing.snapshots.capture(&row);
        self.document.certifications.push(row);
        id
    }

    /// Removes a row after the user confirmed the removal. If the row was
    /// persisted, its server id joins the deletion queue until a delete call
    /// succeeds.
    pub fn remove_experience(&mut self, id: LocalId) {
        Self::remove_row(&mut self.document.experience, id, &mut self.editing);
        self.pagination.invalidate();
    }

    pub fn remove_project(&mut self, id: LocalId) {
        Self::remove_row(&mut self.document.projects, id, &mut self.editing);
        self.pagination.invalidate();
    }

    pub fn remove_skill(&mut self, id: LocalId) {
        Self::remove_row(&mut self.document.skills_links.skills, id, &mut self.editing);
        self.pagination.invalidate();
    }

    pub fn remove_higher_education(&mut self, id: LocalId) {
        Self::remove_row(&mut self.document.education.higher, id, &mut self.editing);
        self.pagination.invalidate();
    }

    pub fn remove_certification(&mut self, id: LocalId) {
        Self::remove_row(&mut self.document.certifications, id, &mut self.editing);
        self.pagination.invalidate();
    }

    fn remove_row<E: Tracked>(rows: &mut Vec<E>, id: LocalId, editing: &mut EditingState) {
        let Some(index) = rows.iter().position(|r| r.local_id() == id) else {
            return;
        };
        let row = rows.remove(index);
        if let Some(server_id) = row.server_id() {
            editing.deletions.request(row.kind(), server_id.clone());
        }
        editing.snapshots.forget(id);
        editing.validation.clear(id);
        editing.feedback.clear(id);
    }

    // ── Saves ───────────────────────────────────────────────────────────────

    pub async fn save_personal(&mut self) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        saver.save(&mut document.personal, editing).await
    }

    pub async fn save_sslc(&mut self) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            pagination,
            ..
        } = self;
        let outcome = saver.save(&mut document.education.sslc, editing).await;
        if outcome == SaveOutcome::Deleted {
            pagination.invalidate();
        }
        outcome
    }

    pub async fn save_pre_university(&mut self) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            pagination,
            ..
        } = self;
        let outcome = saver
            .save(&mut document.education.pre_university, editing)
            .await;
        if outcome == SaveOutcome::Deleted {
            pagination.invalidate();
        }
        outcome
    }

    pub async fn save_higher_education(&mut self, id: LocalId) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        Self::save_row(saver, &mut document.education.higher, id, editing).await
    }

    pub async fn save_experience(&mut self, id: LocalId) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        Self::save_row(saver, &mut document.experience, id, editing).await
    }

    pub async fn save_project(&mut self, id: LocalId) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        Self::save_row(saver, &mut document.projects, id, editing).await
    }

    pub async fn save_skill(&mut self, id: LocalId) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        Self::save_row(saver, &mut document.skills_links.skills, id, editing).await
    }

    /// Saves every skill concurrently; partial success is reported as counts.
    pub async fn save_all_skills(&mut self) -> BulkSaveReport {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        saver
            .save_all(&mut document.skills_links.skills, editing)
            .await
    }

    pub async fn save_links(&mut self) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        saver.save(&mut document.skills_links.links, editing).await
    }

    pub async fn save_summary(&mut self) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        saver
            .save(&mut document.skills_links.summary, editing)
            .await
    }

    pub async fn save_languages(&mut self) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        saver
            .save(&mut document.skills_links.languages, editing)
            .await
    }

    pub async fn save_certification(&mut self, id: LocalId) -> SaveOutcome {
        let Self {
            document,
            editing,
            saver,
            ..
        } = self;
        Self::save_row(saver, &mut document.certifications, id, editing).await
    }

    async fn save_row<E: Tracked>(
        saver: &mut SectionSaver,
        rows: &mut Vec<E>,
        id: LocalId,
        editing: &mut EditingState,
    ) -> SaveOutcome {
        match rows.iter_mut().find(|r| r.local_id() == id) {
            Some(row) => saver.save(row, editing).await,
            None => SaveOutcome::Failed(format!("no record with id {id}")),
        }
    }

    /// Retries deletes that failed or were deferred (finalize step).
    pub async fn flush_deletions(&mut self) -> BulkSaveReport {
        let Self { editing, saver, .. } = self;
        saver.flush_deletions(editing).await
    }

    // ── Resets ──────────────────────────────────────────────────────────────

    pub fn reset_personal(&mut self) {
        let Self {
            document, editing, ..
        } = self;
        Self::reset_record(&mut document.personal, editing);
    }

    pub fn reset_experience(&mut self, id: LocalId) {
        let Self {
            document, editing, ..
        } = self;
        if let Some(row) = document.experience.iter_mut().find(|r| r.local_id == id) {
            Self::reset_record(row, editing);
        }
    }

    pub fn reset_project(&mut self, id: LocalId) {
        let Self {
            document, editing, ..
        } = self;
        if let Some(row) = document.projects.iter_mut().find(|r| r.local_id == id) {
            Self::reset_record(row, editing);
        }
    }

    pub fn reset_skill(&mut self, id: LocalId) {
        let Self {
            document, editing, ..
        } = self;
        if let Some(row) = document
            .skills_links
            .skills
            .iter_mut()
            .find(|r| r.local_id == id)
        {
            Self::reset_record(row, editing);
        }
    }

    pub fn reset_higher_education(&mut self, id: LocalId) {
        let Self {
            document, editing, ..
        } = self;
        if let Some(row) = document
            .education
            .higher
            .iter_mut()
            .find(|r| r.local_id == id)
        {
            Self::reset_record(row, editing);
        }
    }

    pub fn reset_certification(&mut self, id: LocalId) {
        let Self {
            document, editing, ..
        } = self;
        if let Some(row) = document
            .certifications
            .iter_mut()
            .find(|r| r.local_id == id)
        {
            Self::reset_record(row, editing);
        }
    }

    fn reset_record<E: Tracked>(record: &mut E, editing: &mut EditingState) {
        editing.snapshots.reset(record);
        editing.validation.clear(record.local_id());
    }

    // ── Assets ──────────────────────────────────────────────────────────────

    /// Uploads the profile photo and writes its public URL into the document.
    /// On failure the document is untouched.
    pub async fn upload_photo(
        &mut self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, EditorError> {
        let url = self
            .assets
            .upload(&self.ctx, file_name, content_type, data)
            .await
            .map_err(EditorError::Persistence)?;
        self.document.personal.photo_url = url.clone();
        self.pagination.invalidate();
        Ok(url)
    }

    /// Uploads a certificate file for a row; no-op on the document if the
    /// row was removed while the upload was in flight.
    pub async fn upload_certificate_file(
        &mut self,
        id: LocalId,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, EditorError> {
        if !self
            .document
            .certifications
            .iter()
            .any(|c| c.local_id == id)
        {
            return Err(EditorError::NotFound(format!("no certification {id}")));
        }
        let url = self
            .assets
            .upload(&self.ctx, file_name, content_type, data)
            .await
            .map_err(EditorError::Persistence)?;
        if let Some(cert) = self
            .document
            .certifications
            .iter_mut()
            .find(|c| c.local_id == id)
        {
            cert.file_url = url.clone();
        }
        Ok(url)
    }

    // ── Preview ─────────────────────────────────────────────────────────────

    pub fn set_template(&mut self, id: TemplateId) {
        if self.template != id {
            self.template = id;
            self.pagination.invalidate();
        }
    }

    pub fn template(&self) -> TemplateDescriptor {
        descriptor(self.template)
    }

    /// Whether the preview should render the photo: the template must
    /// support it and the document must have one.
    pub fn preview_shows_photo(&self) -> bool {
        self.template().supports_photo && !self.document.personal.photo_url.is_empty()
    }

    /// Layout-pass callback from the preview surface.
    pub fn measure_preview(&mut self, surface: &dyn LayoutSurface) {
        self.pagination.measure(surface);
    }

    /// Content-edit notification from a form; the next layout pass
    /// remeasures.
    pub fn mark_preview_stale(&mut self) {
        self.pagination.invalidate();
    }
}
