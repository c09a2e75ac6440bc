//! The resume document aggregate and its section entities.
//!
//! Exactly one `ResumeDocument` exists per editing session, owned by the
//! session; each form works against one slice and writes it back wholesale.
//! Every editable record implements `Tracked` so the shared dirty tracker
//! and save controller can operate on it. Field maps use the collaborator's
//! external field names.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::editing::tracker::{FieldMap, Tracked};
use crate::editing::validation::{
    is_valid_date, is_valid_email, is_valid_phone, is_valid_url, is_valid_year, FieldError,
};
use crate::models::ids::{LocalId, ServerId};
use crate::store::RecordKind;

fn default_true() -> bool {
    true
}

fn set_string(target: &mut String, fields: &FieldMap, key: &str) {
    if let Some(v) = fields.get(key).and_then(Value::as_str) {
        *target = v.to_string();
    }
}

fn set_bool(target: &mut bool, fields: &FieldMap, key: &str) {
    if let Some(v) = fields.get(key).and_then(Value::as_bool) {
        *target = v;
    }
}

fn set_string_list(target: &mut Vec<String>, fields: &FieldMap, key: &str) {
    if let Some(items) = fields.get(key).and_then(Value::as_array) {
        *target = items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Personal
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub photo_url: String,
}

impl Tracked for PersonalInfo {
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
        RecordKind::Personal
    }
    fn has_identity(&self) -> bool {
        !self.first_name.trim().is_empty()
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("first_name".to_string(), json!(self.first_name)),
            ("last_name".to_string(), json!(self.last_name)),
            ("headline".to_string(), json!(self.headline)),
            ("email".to_string(), json!(self.email)),
            ("phone".to_string(), json!(self.phone)),
            ("city".to_string(), json!(self.city)),
            ("state".to_string(), json!(self.state)),
            ("country".to_string(), json!(self.country)),
            ("photo_url".to_string(), json!(self.photo_url)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.first_name, fields, "first_name");
        set_string(&mut self.last_name, fields, "last_name");
        set_string(&mut self.headline, fields, "headline");
        set_string(&mut self.email, fields, "email");
        set_string(&mut self.phone, fields, "phone");
        set_string(&mut self.city, fields, "city");
        set_string(&mut self.state, fields, "state");
        set_string(&mut self.country, fields, "country");
        set_string(&mut self.photo_url, fields, "photo_url");
    }
    fn clear_fields(&mut self) {
        *self = PersonalInfo {
            local_id: self.local_id,
            server_id: self.server_id.clone(),
            ..PersonalInfo::default()
        };
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.email.is_empty() && !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "enter a valid email address"));
        }
        if !self.phone.is_empty() && !is_valid_phone(&self.phone) {
            errors.push(FieldError::new("phone", "enter a valid phone number"));
        }
        if !self.photo_url.is_empty() && !is_valid_url(&self.photo_url) {
            errors.push(FieldError::new("photo_url", "enter a valid URL"));
        }
        errors
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

/// Which schooling milestone a `SchoolRecord` captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolLevel {
    /// 10th-standard (SSLC) record.
    Sslc,
    /// 12th-standard / pre-university record.
    PreUniversity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolRecord {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    pub level: SchoolLevel,
    /// Disable toggle; saving a disabled, unchanged record deletes it.
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub institution: String,
    pub board: String,
    pub year_of_completion: String,
    pub grade: String,
}

impl SchoolRecord {
    pub fn new(level: SchoolLevel) -> Self {
        Self {
            local_id: LocalId::new(),
            server_id: None,
            level,
            enabled: true,
            institution: String::new(),
            board: String::new(),
            year_of_completion: String::new(),
            grade: String::new(),
        }
    }
}

impl Tracked for SchoolRecord {
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
        match self.level {
            SchoolLevel::Sslc => RecordKind::Sslc,
            SchoolLevel::PreUniversity => RecordKind::PreUniversity,
        }
    }
    fn has_identity(&self) -> bool {
        !self.institution.trim().is_empty()
    }
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("institution".to_string(), json!(self.institution)),
            ("board".to_string(), json!(self.board)),
            (
                "year_of_completion".to_string(),
                json!(self.year_of_completion),
            ),
            ("grade".to_string(), json!(self.grade)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.institution, fields, "institution");
        set_string(&mut self.board, fields, "board");
        set_string(&mut self.year_of_completion, fields, "year_of_completion");
        set_string(&mut self.grade, fields, "grade");
    }
    fn clear_fields(&mut self) {
        self.institution.clear();
        self.board.clear();
        self.year_of_completion.clear();
        self.grade.clear();
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.year_of_completion.is_empty() && !is_valid_year(&self.year_of_completion) {
            errors.push(FieldError::new(
                "year_of_completion",
                "enter a 4-digit year",
            ));
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HigherEducation {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Row expansion in the form UI; never part of the dirty comparison.
    #[serde(skip)]
    pub expanded: bool,
    pub degree: String,
    pub institution: String,
    pub field_of_study: String,
    pub start_year: String,
    pub end_year: String,
    pub grade: String,
}

impl HigherEducation {
    pub fn new() -> Self {
        Self {
            local_id: LocalId::new(),
            server_id: None,
            enabled: true,
            expanded: false,
            degree: String::new(),
            institution: String::new(),
            field_of_study: String::new(),
            start_year: String::new(),
            end_year: String::new(),
            grade: String::new(),
        }
    }
}

impl Default for HigherEducation {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracked for HigherEducation {
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
        RecordKind::HigherEducation
    }
    fn has_identity(&self) -> bool {
        !self.degree.trim().is_empty()
    }
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("degree".to_string(), json!(self.degree)),
            ("institution".to_string(), json!(self.institution)),
            ("field_of_study".to_string(), json!(self.field_of_study)),
            ("start_year".to_string(), json!(self.start_year)),
            ("end_year".to_string(), json!(self.end_year)),
            ("grade".to_string(), json!(self.grade)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.degree, fields, "degree");
        set_string(&mut self.institution, fields, "institution");
        set_string(&mut self.field_of_study, fields, "field_of_study");
        set_string(&mut self.start_year, fields, "start_year");
        set_string(&mut self.end_year, fields, "end_year");
        set_string(&mut self.grade, fields, "grade");
    }
    fn clear_fields(&mut self) {
        self.degree.clear();
        self.institution.clear();
        self.field_of_study.clear();
        self.start_year.clear();
        self.end_year.clear();
        self.grade.clear();
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.start_year.is_empty() && !is_valid_year(&self.start_year) {
            errors.push(FieldError::new("start_year", "enter a 4-digit year"));
        }
        if !self.end_year.is_empty() && !is_valid_year(&self.end_year) {
            errors.push(FieldError::new("end_year", "enter a 4-digit year"));
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationSection {
    pub sslc: SchoolRecord,
    pub pre_university: SchoolRecord,
    pub higher: Vec<HigherEducation>,
}

impl Default for EducationSection {
    fn default() -> Self {
        Self {
            sslc: SchoolRecord::new(SchoolLevel::Sslc),
            pre_university: SchoolRecord::new(SchoolLevel::PreUniversity),
            higher: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(skip)]
    pub expanded: bool,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub currently_working: bool,
    pub description: String,
}

impl WorkExperience {
    pub fn new() -> Self {
        Self {
            local_id: LocalId::new(),
            server_id: None,
            enabled: true,
            expanded: false,
            title: String::new(),
            company: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            currently_working: false,
            description: String::new(),
        }
    }
}

impl Default for WorkExperience {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracked for WorkExperience {
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
        RecordKind::Experience
    }
    fn has_identity(&self) -> bool {
        !self.title.trim().is_empty()
    }
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("title".to_string(), json!(self.title)),
            ("company".to_string(), json!(self.company)),
            ("location".to_string(), json!(self.location)),
            ("start_date".to_string(), json!(self.start_date)),
            ("end_date".to_string(), json!(self.end_date)),
            (
                "currently_working".to_string(),
                json!(self.currently_working),
            ),
            ("description".to_string(), json!(self.description)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.title, fields, "title");
        set_string(&mut self.company, fields, "company");
        set_string(&mut self.location, fields, "location");
        set_string(&mut self.start_date, fields, "start_date");
        set_string(&mut self.end_date, fields, "end_date");
        set_bool(&mut self.currently_working, fields, "currently_working");
        set_string(&mut self.description, fields, "description");
    }
    fn clear_fields(&mut self) {
        self.title.clear();
        self.company.clear();
        self.location.clear();
        self.start_date.clear();
        self.end_date.clear();
        self.currently_working = false;
        self.description.clear();
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.start_date.is_empty() && !is_valid_date(&self.start_date) {
            errors.push(FieldError::new("start_date", "use YYYY-MM or YYYY-MM-DD"));
        }
        if !self.end_date.is_empty() && !is_valid_date(&self.end_date) {
            errors.push(FieldError::new("end_date", "use YYYY-MM or YYYY-MM-DD"));
        }
        errors
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub name: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub url: String,
    pub start_date: String,
    pub end_date: String,
}

impl Project {
    pub fn new() -> Self {
        Self {
            local_id: LocalId::new(),
            server_id: None,
            enabled: true,
            name: String::new(),
            description: String::new(),
            tech_stack: Vec::new(),
            url: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracked for Project {
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
        RecordKind::Project
    }
    fn has_identity(&self) -> bool {
        !self.name.trim().is_empty()
    }
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("name".to_string(), json!(self.name)),
            ("description".to_string(), json!(self.description)),
            ("tech_stack".to_string(), json!(self.tech_stack)),
            ("url".to_string(), json!(self.url)),
            ("start_date".to_string(), json!(self.start_date)),
            ("end_date".to_string(), json!(self.end_date)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.name, fields, "name");
        set_string(&mut self.description, fields, "description");
        set_string_list(&mut self.tech_stack, fields, "tech_stack");
        set_string(&mut self.url, fields, "url");
        set_string(&mut self.start_date, fields, "start_date");
        set_string(&mut self.end_date, fields, "end_date");
    }
    fn clear_fields(&mut self) {
        self.name.clear();
        self.description.clear();
        self.tech_stack.clear();
        self.url.clear();
        self.start_date.clear();
        self.end_date.clear();
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.url.is_empty() && !is_valid_url(&self.url) {
            errors.push(FieldError::new("url", "enter a valid URL"));
        }
        if !self.start_date.is_empty() && !is_valid_date(&self.start_date) {
            errors.push(FieldError::new("start_date", "use YYYY-MM or YYYY-MM-DD"));
        }
        if !self.end_date.is_empty() && !is_valid_date(&self.end_date) {
            errors.push(FieldError::new("end_date", "use YYYY-MM or YYYY-MM-DD"));
        }
        errors
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills, links, summary, languages
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    pub title: String,
    /// Skill grouping ("language", "framework", ...); external key `type`.
    pub category: String,
    pub proficiency: String,
}

impl Skill {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracked for Skill {
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
        RecordKind::Skill
    }
    fn has_identity(&self) -> bool {
        !self.title.trim().is_empty()
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("title".to_string(), json!(self.title)),
            ("type".to_string(), json!(self.category)),
            ("proficiency".to_string(), json!(self.proficiency)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.title, fields, "title");
        set_string(&mut self.category, fields, "type");
        set_string(&mut self.proficiency, fields, "proficiency");
    }
    fn clear_fields(&mut self) {
        self.title.clear();
        self.category.clear();
        self.proficiency.clear();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksBundle {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub twitter: String,
    pub other: String,
}

impl LinksBundle {
    fn entries(&self) -> [(&'static str, &String); 5] {
        [
            ("linkedin", &self.linkedin),
            ("github", &self.github),
            ("portfolio", &self.portfolio),
            ("twitter", &self.twitter),
            ("other", &self.other),
        ]
    }
}

impl Tracked for LinksBundle {
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
        RecordKind::Links
    }
    fn has_identity(&self) -> bool {
        self.entries().iter().any(|(_, v)| !v.trim().is_empty())
    }
    fn field_map(&self) -> FieldMap {
        self.entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.linkedin, fields, "linkedin");
        set_string(&mut self.github, fields, "github");
        set_string(&mut self.portfolio, fields, "portfolio");
        set_string(&mut self.twitter, fields, "twitter");
        set_string(&mut self.other, fields, "other");
    }
    fn clear_fields(&mut self) {
        self.linkedin.clear();
        self.github.clear();
        self.portfolio.clear();
        self.twitter.clear();
        self.other.clear();
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("linkedin", &self.linkedin),
            ("github", &self.github),
            ("portfolio", &self.portfolio),
            ("twitter", &self.twitter),
            ("other", &self.other),
        ] {
            if !value.is_empty() && !is_valid_url(value) {
                errors.push(FieldError::new(field, "enter a valid URL"));
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalSummary {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    pub text: String,
}

impl Tracked for TechnicalSummary {
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
        !self.text.trim().is_empty()
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([("summary".to_string(), json!(self.text))])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.text, fields, "summary");
    }
    fn clear_fields(&mut self) {
        self.text.clear();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageList {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    pub languages: Vec<String>,
}

impl Tracked for LanguageList {
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
        RecordKind::Languages
    }
    fn has_identity(&self) -> bool {
        self.languages.iter().any(|l| !l.trim().is_empty())
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([("languages".to_string(), json!(self.languages))])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string_list(&mut self.languages, fields, "languages");
    }
    fn clear_fields(&mut self) {
        self.languages.clear();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsLinks {
    pub skills: Vec<Skill>,
    pub links: LinksBundle,
    pub summary: TechnicalSummary,
    pub languages: LanguageList,
}

// ────────────────────────────────────────────────────────────────────────────
// Certifications
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default)]
    pub local_id: LocalId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    pub expiry_date: String,
    pub credential_id: String,
    pub file_url: String,
}

impl Certification {
    pub fn new() -> Self {
        Self {
            local_id: LocalId::new(),
            server_id: None,
            enabled: true,
            name: String::new(),
            issuer: String::new(),
            issue_date: String::new(),
            expiry_date: String::new(),
            credential_id: String::new(),
            file_url: String::new(),
        }
    }
}

impl Default for Certification {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracked for Certification {
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
        RecordKind::Certification
    }
    fn has_identity(&self) -> bool {
        !self.name.trim().is_empty()
    }
    fn enabled(&self) -> bool {
        self.enabled
    }
    fn field_map(&self) -> FieldMap {
        FieldMap::from([
            ("name".to_string(), json!(self.name)),
            ("issuer".to_string(), json!(self.issuer)),
            ("issue_date".to_string(), json!(self.issue_date)),
            ("expiry_date".to_string(), json!(self.expiry_date)),
            ("credential_id".to_string(), json!(self.credential_id)),
            ("file_url".to_string(), json!(self.file_url)),
        ])
    }
    fn apply_field_map(&mut self, fields: &FieldMap) {
        set_string(&mut self.name, fields, "name");
        set_string(&mut self.issuer, fields, "issuer");
        set_string(&mut self.issue_date, fields, "issue_date");
        set_string(&mut self.expiry_date, fields, "expiry_date");
        set_string(&mut self.credential_id, fields, "credential_id");
        set_string(&mut self.file_url, fields, "file_url");
    }
    fn clear_fields(&mut self) {
        self.name.clear();
        self.issuer.clear();
        self.issue_date.clear();
        self.expiry_date.clear();
        self.credential_id.clear();
        self.file_url.clear();
    }
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.issue_date.is_empty() && !is_valid_date(&self.issue_date) {
            errors.push(FieldError::new("issue_date", "use YYYY-MM or YYYY-MM-DD"));
        }
        if !self.expiry_date.is_empty() && !is_valid_date(&self.expiry_date) {
            errors.push(FieldError::new("expiry_date", "use YYYY-MM or YYYY-MM-DD"));
        }
        if !self.file_url.is_empty() && !is_valid_url(&self.file_url) {
            errors.push(FieldError::new("file_url", "enter a valid URL"));
        }
        errors
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate
// ────────────────────────────────────────────────────────────────────────────

/// The aggregate root. One instance per editing session; each form component
/// receives exactly one slice and replaces it wholesale on write-back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub personal: PersonalInfo,
    pub education: EducationSection,
    pub experience: Vec<WorkExperience>,
    pub projects: Vec<Project>,
    pub skills_links: SkillsLinks,
    pub certifications: Vec<Certification>,
}
