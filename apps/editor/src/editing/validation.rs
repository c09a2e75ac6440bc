//! Local field validation.
//!
//! Format checks run before any save decision; a record with outstanding
//! field errors is blocked from saving until the fields are corrected.
//! Checks are plain string/char-class predicates — good enough to catch the
//! real mistakes (missing `@`, letters in a year) without a parser.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::ids::LocalId;

/// One field-scoped validation failure, shown inline next to the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

pub fn is_valid_phone(s: &str) -> bool {
    let digits = s.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && digits <= 15
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

pub fn is_valid_url(s: &str) -> bool {
    (s.starts_with("http://") || s.starts_with("https://"))
        && !s.chars().any(char::is_whitespace)
        && s.splitn(2, "://").nth(1).is_some_and(|rest| rest.contains('.'))
}

pub fn is_valid_year(s: &str) -> bool {
    s.len() == 4
        && s.chars().all(|c| c.is_ascii_digit())
        && (1900..=2100).contains(&s.parse::<u16>().unwrap_or(0))
}

/// Accepts `YYYY-MM` or `YYYY-MM-DD` (the wire format the forms emit).
pub fn is_valid_date(s: &str) -> bool {
    let mut parts = s.split('-');
    let Some(year) = parts.next() else { return false };
    let Some(month) = parts.next() else { return false };
    if !is_valid_year(year) {
        return false;
    }
    let month_ok = month.len() == 2 && (1..=12).contains(&month.parse::<u8>().unwrap_or(0));
    match parts.next() {
        None => month_ok,
        Some(day) => {
            month_ok
                && parts.next().is_none()
                && day.len() == 2
                && (1..=31).contains(&day.parse::<u8>().unwrap_or(0))
        }
    }
}

/// Per-record field error map, tracked independently of dirty state.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    by_record: HashMap<LocalId, Vec<FieldError>>,
}

impl ValidationErrors {
    /// Replaces the error set for a record; an empty set clears it.
    pub fn set(&mut self, id: LocalId, errors: Vec<FieldError>) {
        if errors.is_empty() {
            self.by_record.remove(&id);
        } else {
            self.by_record.insert(id, errors);
        }
    }

    pub fn clear(&mut self, id: LocalId) {
        self.by_record.remove(&id);
    }

    pub fn has_errors(&self, id: LocalId) -> bool {
        self.by_record.contains_key(&id)
    }

    pub fn errors(&self, id: LocalId) -> &[FieldError] {
        self.by_record.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn field_error(&self, id: LocalId, field: &str) -> Option<&FieldError> {
        self.errors(id).iter().find(|e| e.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_common_forms() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.io"));
    }

    #[test]
    fn test_email_rejects_malformed() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@missing-local.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
        assert!(!is_valid_email("dot@end."));
    }

    #[test]
    fn test_phone_bounds() {
        assert!(is_valid_phone("+91 98765 43210"));
        assert!(is_valid_phone("(080) 1234-567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me maybe"));
    }

    #[test]
    fn test_url_requires_scheme() {
        assert!(is_valid_url("https://github.com/someone"));
        assert!(!is_valid_url("github.com/someone"));
        assert!(!is_valid_url("https://nodot"));
    }

    #[test]
    fn test_year_range() {
        assert!(is_valid_year("2021"));
        assert!(!is_valid_year("21"));
        assert!(!is_valid_year("1850"));
        assert!(!is_valid_year("20x1"));
    }

    #[test]
    fn test_date_formats() {
        assert!(is_valid_date("2021-04"));
        assert!(is_valid_date("2021-04-30"));
        assert!(!is_valid_date("2021"));
        assert!(!is_valid_date("2021-13"));
        assert!(!is_valid_date("2021-04-99"));
    }

    #[test]
    fn test_error_map_set_and_clear() {
        let mut errors = ValidationErrors::default();
        let id = LocalId::new();
        errors.set(id, vec![FieldError::new("email", "invalid email")]);
        assert!(errors.has_errors(id));
        assert!(errors.field_error(id, "email").is_some());
        assert!(errors.field_error(id, "phone").is_none());

        // setting an empty list clears the record
        errors.set(id, vec![]);
        assert!(!errors.has_errors(id));
    }
}
