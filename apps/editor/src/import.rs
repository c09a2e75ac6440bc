//! Import/merge adapter.
//!
//! Normalizes heterogeneous external resume payloads (parsed uploads,
//! duplicated templates, the persistence API's own records) into the
//! document's shape. Each top-level section is replaced wholesale when the
//! payload supplies a non-empty value for it, and left untouched otherwise —
//! a section is never partially merged. Rebuilt records get fresh local ids;
//! server ids are carried through when the source provides them, so later
//! saves update instead of create.
//!
//! Field lookup tolerates multiple key spellings (snake_case, camelCase,
//! dotted nested paths); the first non-empty match wins.

use serde_json::Value;

use crate::models::document::{
    Certification, EducationSection, HigherEducation, LanguageList, LinksBundle, PersonalInfo,
    Project, ResumeDocument, SchoolLevel, SchoolRecord, Skill, SkillsLinks, TechnicalSummary,
    WorkExperience,
};
use crate::models::ids::{LocalId, ServerId};

// ────────────────────────────────────────────────────────────────────────────
// Lookup helpers
// ────────────────────────────────────────────────────────────────────────────

/// Resolves a key against an object; `a.b` descends into nested objects.
fn value_at<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(obj, |v, part| v.get(part))
}

fn non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// First non-empty string (or number, stringified) among the key spellings.
fn string_at(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value_at(obj, key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn bool_at(obj: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .find_map(|key| value_at(obj, key).and_then(Value::as_bool))
}

/// String list from an array of strings, an array of `{name}` objects, or a
/// comma-separated string.
fn list_at(obj: &Value, keys: &[&str]) -> Option<Vec<String>> {
    let value = keys
        .iter()
        .find_map(|key| value_at(obj, key).filter(|v| non_empty(v)))?;
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Object(_) => string_at(item, &["name", "title", "language"]),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Server id under any of its common spellings, so re-imported records keep
/// targeting update rather than create.
pub(crate) fn server_id_at(obj: &Value) -> Option<ServerId> {
    ["_id", "id", "server_id"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(ServerId::from_value))
}

fn string_or(obj: &Value, keys: &[&str]) -> String {
    string_at(obj, keys).unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-record constructors (also used to hydrate from the persistence API)
// ────────────────────────────────────────────────────────────────────────────

pub fn personal_from_value(value: &Value) -> PersonalInfo {
    let mut first_name = string_or(value, &["first_name", "firstName", "firstname"]);
    let mut last_name = string_or(value, &["last_name", "lastName", "lastname", "surname"]);
    // fall back to splitting a combined name field
    if first_name.is_empty() {
        if let Some(full) = string_at(value, &["name", "full_name", "fullName"]) {
            match full.split_once(' ') {
                Some((first, rest)) => {
                    first_name = first.to_string();
                    if last_name.is_empty() {
                        last_name = rest.trim().to_string();
                    }
                }
                None => first_name = full,
            }
        }
    }
    PersonalInfo {
        local_id: LocalId::new(),
        server_id: server_id_at(value),
        first_name,
        last_name,
        headline: string_or(value, &["headline", "title", "designation", "label"]),
        email: string_or(value, &["email", "email_id", "emailId"]),
        phone: string_or(value, &["phone", "mobile", "phone_number", "phoneNumber"]),
        city: string_or(value, &["city", "location.city", "address.city"]),
        state: string_or(value, &["state", "location.state", "address.state"]),
        country: string_or(value, &["country", "location.country", "address.country"]),
        photo_url: string_or(value, &["photo_url", "photoUrl", "photo", "avatar", "image"]),
    }
}

pub fn school_from_value(level: SchoolLevel, value: &Value) -> SchoolRecord {
    let mut record = SchoolRecord::new(level);
    record.server_id = server_id_at(value);
    record.institution = string_or(
        value,
        &["institution", "school", "school_name", "schoolName", "college"],
    );
    record.board = string_or(value, &["board", "university"]);
    record.year_of_completion = string_or(
        value,
        &[
            "year_of_completion",
            "yearOfCompletion",
            "year",
            "passing_year",
            "passingYear",
        ],
    );
    record.grade = string_or(value, &["grade", "percentage", "score", "cgpa"]);
    record
}

pub fn higher_education_from_value(value: &Value) -> HigherEducation {
    let mut row = HigherEducation::new();
    row.server_id = server_id_at(value);
    row.degree = string_or(value, &["degree", "qualification", "course", "studyType"]);
    row.institution = string_or(
        value,
        &["institution", "college", "university", "school"],
    );
    row.field_of_study = string_or(
        value,
        &["field_of_study", "fieldOfStudy", "branch", "major", "area"],
    );
    row.start_year = string_or(value, &["start_year", "startYear", "from", "startDate"]);
    row.end_year = string_or(value, &["end_year", "endYear", "to", "endDate"]);
    row.grade = string_or(value, &["grade", "cgpa", "score", "percentage", "gpa"]);
    row
}

pub fn experience_from_value(value: &Value) -> WorkExperience {
    let mut exp = WorkExperience::new();
    exp.server_id = server_id_at(value);
    exp.title = string_or(
        value,
        &["title", "role", "position", "job_title", "jobTitle"],
    );
    exp.company = string_or(value, &["company", "organization", "employer", "name"]);
    exp.location = string_or(value, &["location", "city"]);
    exp.start_date = string_or(value, &["start_date", "startDate", "from"]);
    exp.end_date = string_or(value, &["end_date", "endDate", "to"]);
    exp.currently_working = bool_at(
        value,
        &["currently_working", "currentlyWorking", "current", "is_current"],
    )
    .unwrap_or(false);
    exp.description = string_or(value, &["description", "summary", "details"]);
    exp
}

pub fn project_from_value(value: &Value) -> Project {
    let mut project = Project::new();
    project.server_id = server_id_at(value);
    project.name = string_or(value, &["name", "title", "project_name", "projectName"]);
    project.description = string_or(value, &["description", "summary", "details"]);
    project.tech_stack =
        list_at(value, &["tech_stack", "techStack", "technologies", "stack", "keywords"])
            .unwrap_or_default();
    project.url = string_or(value, &["url", "link", "repo", "github", "demo"]);
    project.start_date = string_or(value, &["start_date", "startDate", "from"]);
    project.end_date = string_or(value, &["end_date", "endDate", "to"]);
    project
}

pub fn skill_from_value(value: &Value) -> Skill {
    match value {
        // bare string shorthand: "Rust"
        Value::String(s) => {
            let mut skill = Skill::new();
            skill.title = s.trim().to_string();
            skill
        }
        _ => {
            let mut skill = Skill::new();
            skill.server_id = server_id_at(value);
            skill.title = string_or(value, &["title", "name", "skill"]);
            skill.category = string_or(value, &["type", "category", "group"]);
            skill.proficiency = string_or(value, &["proficiency", "level"]);
            skill
        }
    }
}

pub fn links_from_value(value: &Value) -> LinksBundle {
    let mut links = LinksBundle::default();
    links.server_id = server_id_at(value);
    links.linkedin = string_or(value, &["linkedin", "linkedIn", "linkedin_url", "linkedinUrl"]);
    links.github = string_or(value, &["github", "github_url", "githubUrl"]);
    links.portfolio = string_or(value, &["portfolio", "website", "site", "homepage"]);
    links.twitter = string_or(value, &["twitter", "x"]);
    links.other = string_or(value, &["other", "blog"]);
    links
}

pub fn summary_from_value(value: &Value) -> TechnicalSummary {
    let mut summary = TechnicalSummary::default();
    match value {
        Value::String(s) => summary.text = s.trim().to_string(),
        _ => {
            summary.server_id = server_id_at(value);
            summary.text = string_or(value, &["summary", "text", "technical_summary", "about"]);
        }
    }
    summary
}

pub fn languages_from_value(value: &Value) -> LanguageList {
    let mut list = LanguageList::default();
    match value {
        Value::Array(_) => {
            let wrapper = serde_json::json!({ "languages": value });
            list.languages = list_at(&wrapper, &["languages"]).unwrap_or_default();
        }
        _ => {
            list.server_id = server_id_at(value);
            list.languages =
                list_at(value, &["languages", "language_list", "languageList"]).unwrap_or_default();
        }
    }
    list
}

pub fn certification_from_value(value: &Value) -> Certification {
    let mut cert = Certification::new();
    cert.server_id = server_id_at(value);
    cert.name = string_or(
        value,
        &["name", "title", "certificate_name", "certificateName"],
    );
    cert.issuer = string_or(value, &["issuer", "organization", "authority"]);
    cert.issue_date = string_or(value, &["issue_date", "issueDate", "date"]);
    cert.expiry_date = string_or(value, &["expiry_date", "expiryDate", "valid_until", "validUntil"]);
    cert.credential_id = string_or(value, &["credential_id", "credentialId", "license"]);
    cert.file_url = string_or(
        value,
        &["file_url", "fileUrl", "certificate_url", "certificateUrl", "url"],
    );
    cert
}

// ────────────────────────────────────────────────────────────────────────────
// Merge
// ────────────────────────────────────────────────────────────────────────────

/// First section value present and non-empty among the key spellings.
fn section<'a>(imported: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| value_at(imported, key).filter(|v| non_empty(v)))
}

fn array_of(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Merges an external payload into the document. Sections supplied by the
/// payload are replaced wholesale; absent sections stay untouched. Runs at
/// most once per import event.
pub fn merge_document(current: &mut ResumeDocument, imported: &Value) {
    if let Some(value) = section(
        imported,
        &["personal", "personal_info", "personalInfo", "basics"],
    ) {
        current.personal = personal_from_value(value);
    }

    if let Some(value) = section(imported, &["education", "educations"]) {
        current.education = education_from_value(value);
    }

    if let Some(value) = section(
        imported,
        &[
            "experience",
            "experiences",
            "work_experience",
            "workExperience",
            "work",
        ],
    ) {
        current.experience = array_of(value)
            .into_iter()
            .map(experience_from_value)
            .collect();
    }

    if let Some(value) = section(imported, &["projects", "project_list", "projectList"]) {
        current.projects = array_of(value).into_iter().map(project_from_value).collect();
    }

    merge_skills_links(&mut current.skills_links, imported);

    if let Some(value) = section(imported, &["certifications", "certificates", "certs"]) {
        current.certifications = array_of(value)
            .into_iter()
            .map(certification_from_value)
            .collect();
    }
}

fn education_from_value(value: &Value) -> EducationSection {
    let mut education = EducationSection::default();
    match value {
        // a bare array means higher-education rows only
        Value::Array(rows) => {
            education.higher = rows.iter().map(higher_education_from_value).collect();
        }
        _ => {
            if let Some(sslc) = section(value, &["sslc", "tenth", "class_10", "ssc"]) {
                education.sslc = school_from_value(SchoolLevel::Sslc, sslc);
            }
            if let Some(pu) = section(
                value,
                &["pu", "pre_university", "preUniversity", "twelfth", "class_12", "hsc"],
            ) {
                education.pre_university = school_from_value(SchoolLevel::PreUniversity, pu);
            }
            if let Some(higher) = section(value, &["higher", "degrees", "graduation", "college"]) {
                education.higher = array_of(higher)
                    .into_iter()
                    .map(higher_education_from_value)
                    .collect();
            }
        }
    }
    education
}

fn merge_skills_links(target: &mut SkillsLinks, imported: &Value) {
    if let Some(value) = section(imported, &["skills", "skill_list", "skillList"]) {
        target.skills = array_of(value).into_iter().map(skill_from_value).collect();
    }
    if let Some(value) = section(
        imported,
        &["links", "social_links", "socialLinks", "profiles"],
    ) {
        target.links = links_from_value(value);
    }
    if let Some(value) = section(
        imported,
        &["summary", "technical_summary", "technicalSummary", "about"],
    ) {
        target.summary = summary_from_value(value);
    }
    if let Some(value) = section(imported, &["languages", "language_list", "languageList"]) {
        target.languages = languages_from_value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supplied_sections_replace_absent_sections_survive() {
        let mut doc = ResumeDocument::default();
        doc.projects.push({
            let mut p = Project::new();
            p.name = "Keep me".into();
            p
        });
        let original_project_id = doc.projects[0].local_id;

        merge_document(
            &mut doc,
            &json!({
                "experiences": [
                    {"title": "Engineer", "company": "Acme"},
                    {"role": "Intern", "employer": "Beta"}
                ]
            }),
        );

        assert_eq!(doc.experience.len(), 2);
        assert_eq!(doc.experience[0].title, "Engineer");
        assert_eq!(doc.experience[1].title, "Intern");
        assert_eq!(doc.experience[1].company, "Beta");
        // projects slice untouched, same record identity
        assert_eq!(doc.projects.len(), 1);
        assert_eq!(doc.projects[0].local_id, original_project_id);
    }

    #[test]
    fn test_server_ids_carry_through_so_saves_update() {
        let mut doc = ResumeDocument::default();
        merge_document(
            &mut doc,
            &json!({"skills": [{"_id": "s1", "name": "Rust"}, {"title": "Go"}]}),
        );
        assert_eq!(doc.skills_links.skills[0].server_id, Some(ServerId::new("s1")));
        assert!(doc.skills_links.skills[1].server_id.is_none());
    }

    #[test]
    fn test_fresh_local_ids_per_import() {
        let mut doc = ResumeDocument::default();
        let payload = json!({"projects": [{"name": "P"}]});
        merge_document(&mut doc, &payload);
        let first = doc.projects[0].local_id;
        merge_document(&mut doc, &payload);
        assert_ne!(doc.projects[0].local_id, first);
    }

    #[test]
    fn test_key_spelling_fallbacks() {
        let exp = experience_from_value(&json!({
            "jobTitle": "SRE",
            "organization": "Gamma",
            "startDate": "2020-01",
            "is_current": true
        }));
        assert_eq!(exp.title, "SRE");
        assert_eq!(exp.company, "Gamma");
        assert_eq!(exp.start_date, "2020-01");
        assert!(exp.currently_working);
    }

    #[test]
    fn test_first_non_empty_spelling_wins() {
        let project = project_from_value(&json!({
            "name": "",
            "title": "Real Name"
        }));
        assert_eq!(project.name, "Real Name");
    }

    #[test]
    fn test_personal_splits_combined_name() {
        let personal = personal_from_value(&json!({
            "name": "Asha Rao",
            "location": {"city": "Bengaluru", "country": "India"}
        }));
        assert_eq!(personal.first_name, "Asha");
        assert_eq!(personal.last_name, "Rao");
        assert_eq!(personal.city, "Bengaluru");
        assert_eq!(personal.country, "India");
    }

    #[test]
    fn test_education_object_with_school_records() {
        let mut doc = ResumeDocument::default();
        merge_document(
            &mut doc,
            &json!({
                "education": {
                    "tenth": {"school": "St. Mary's", "year": 2014, "percentage": "92%"},
                    "pu": {"institution": "PU College", "yearOfCompletion": "2016"},
                    "higher": [{"degree": "B.E.", "college": "RVCE", "cgpa": 9.1}]
                }
            }),
        );
        assert_eq!(doc.education.sslc.institution, "St. Mary's");
        assert_eq!(doc.education.sslc.year_of_completion, "2014");
        assert_eq!(doc.education.pre_university.institution, "PU College");
        assert_eq!(doc.education.higher.len(), 1);
        assert_eq!(doc.education.higher[0].grade, "9.1");
    }

    #[test]
    fn test_bare_education_array_means_higher_rows() {
        let mut doc = ResumeDocument::default();
        merge_document(
            &mut doc,
            &json!({"education": [{"degree": "M.Tech", "university": "IISc"}]}),
        );
        assert_eq!(doc.education.higher.len(), 1);
        assert_eq!(doc.education.higher[0].degree, "M.Tech");
        // school records untouched
        assert!(doc.education.sslc.institution.is_empty());
    }

    #[test]
    fn test_skills_accept_bare_strings_and_objects() {
        let mut doc = ResumeDocument::default();
        merge_document(
            &mut doc,
            &json!({"skills": ["Rust", {"title": "Go", "type": "language"}]}),
        );
        assert_eq!(doc.skills_links.skills.len(), 2);
        assert_eq!(doc.skills_links.skills[0].title, "Rust");
        assert_eq!(doc.skills_links.skills[1].category, "language");
    }

    #[test]
    fn test_languages_from_string_array_and_object_array() {
        let a = languages_from_value(&json!(["English", "Kannada"]));
        assert_eq!(a.languages, vec!["English", "Kannada"]);
        let b = languages_from_value(&json!([{"name": "Hindi"}]));
        assert_eq!(b.languages, vec!["Hindi"]);
    }

    #[test]
    fn test_empty_sections_do_not_replace() {
        let mut doc = ResumeDocument::default();
        doc.experience.push({
            let mut e = WorkExperience::new();
            e.title = "Keep".into();
            e
        });
        merge_document(&mut doc, &json!({"experiences": [], "projects": null}));
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.experience[0].title, "Keep");
    }

    #[test]
    fn test_tech_stack_from_comma_separated_string() {
        let project = project_from_value(&json!({"name": "P", "stack": "rust, tokio , serde"}));
        assert_eq!(project.tech_stack, vec!["rust", "tokio", "serde"]);
    }
}
