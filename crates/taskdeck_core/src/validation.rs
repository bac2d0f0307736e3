//! crates/taskdeck_core/src/validation.rs
//!
//! Client-side form validation. Every check here runs before anything is sent
//! to the remote service, and a failing form is never submitted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

pub const TITLE_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 72;

/// Slot used for failures that belong to no single field.
pub const GENERAL_FIELD: &str = "general";

/// One message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(GENERAL_FIELD, message)
    }
}

/// The outcome of validating a whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }
}

/// Title must be non-empty after trimming and at most 255 characters.
pub fn validate_title(title: &str) -> Option<&'static str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Some("Title is required")
    } else if trimmed.chars().count() > TITLE_MAX_CHARS {
        Some("Title must be 255 characters or less")
    } else {
        None
    }
}

/// Parses a calendar date or timestamp into UTC.
///
/// Accepts a calendar date (`2025-01-31`, read as midnight UTC), an RFC 3339
/// timestamp, or a naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` timestamp read as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parses a due date typed into a form. Blank input means "no due date".
pub fn parse_due_date(input: &str) -> Result<Option<DateTime<Utc>>, &'static str> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_timestamp(input)
        .map(Some)
        .ok_or("Invalid date format")
}

/// Validates the fields of the task create/edit form.
pub fn validate_task_form(title: &str, due_date: &str) -> ValidationResult {
    let mut result = ValidationResult::default();
    if let Some(message) = validate_title(title) {
        result.push("title", message);
    }
    if let Err(message) = parse_due_date(due_date) {
        result.push("due_date", message);
    }
    result
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"))
}

/// Loose `something@something.something` check, no whitespace allowed.
pub fn looks_like_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub fn validate_login_form(email: &str, password: &str) -> ValidationResult {
    let mut result = ValidationResult::default();
    if email.is_empty() {
        result.push("email", "Email is required");
    } else if !looks_like_email(email) {
        result.push("email", "Email is invalid");
    }
    if password.is_empty() {
        result.push("password", "Password is required");
    }
    result
}

pub fn validate_registration_form(email: &str, password: &str) -> ValidationResult {
    let mut result = validate_login_form(email, password);
    let length = password.chars().count();
    if !password.is_empty() && !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&length) {
        result.push("password", "Password must be between 8 and 72 characters");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn title_boundaries() {
        assert_eq!(validate_title(""), Some("Title is required"));
        assert_eq!(validate_title("   "), Some("Title is required"));
        assert_eq!(validate_title(&"a".repeat(255)), None);
        assert_eq!(
            validate_title(&"a".repeat(256)),
            Some("Title must be 255 characters or less")
        );
    }

    #[test]
    fn title_length_counts_characters_after_trim() {
        let padded = format!("  {}  ", "é".repeat(255));
        assert_eq!(validate_title(&padded), None);
    }

    #[test]
    fn due_date_accepts_calendar_dates_and_timestamps() {
        let date = parse_due_date("2025-03-09").unwrap().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 3, 9));
        assert!(parse_due_date("2025-03-09T10:00:00Z").unwrap().is_some());
        assert!(parse_due_date("2025-03-09T10:00").unwrap().is_some());
        assert_eq!(parse_due_date("").unwrap(), None);
    }

    #[test]
    fn naive_server_timestamps_read_as_utc() {
        let ts = parse_timestamp("2025-03-09T10:15:30.123456").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-09T10:15:30.123456+00:00");
    }

    #[test]
    fn due_date_rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_due_date("next tuesday"), Err("Invalid date format"));
        assert_eq!(parse_due_date("2025-02-30"), Err("Invalid date format"));
    }

    #[test]
    fn task_form_reports_one_message_per_field() {
        let result = validate_task_form("", "not a date");
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.message_for("title"), Some("Title is required"));
        assert_eq!(result.message_for("due_date"), Some("Invalid date format"));

        assert!(validate_task_form("Buy milk", "").is_valid());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.de"));
        assert!(!looks_like_email("a@.co"));
    }

    #[test]
    fn login_form_messages() {
        let result = validate_login_form("", "");
        assert_eq!(result.message_for("email"), Some("Email is required"));
        assert_eq!(result.message_for("password"), Some("Password is required"));

        let result = validate_login_form("nope", "secret");
        assert_eq!(result.message_for("email"), Some("Email is invalid"));
        assert!(result.message_for("password").is_none());
    }

    #[test]
    fn registration_password_length() {
        assert!(!validate_registration_form("a@b.co", "short").is_valid());
        assert!(validate_registration_form("a@b.co", "long enough").is_valid());
        assert!(!validate_registration_form("a@b.co", &"x".repeat(73)).is_valid());
    }
}
