//! Schema validation for raw complaint submissions.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::error::ValidationError;

/// Problem description length bounds, inclusive.
pub const PROBLEM_MIN_CHARS: usize = 20;
pub const PROBLEM_MAX_CHARS: usize = 5000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Raw field values from the submission form, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComplaint {
    #[serde(default)]
    pub problem: String,
    /// Empty string means "not provided".
    #[serde(default)]
    pub email: String,
}

/// A validated complaint submission. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintSubmission {
    pub problem: String,
    pub email: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Validate raw field values into a `ComplaintSubmission`.
///
/// Fields are checked in declaration order (problem, then email) and the
/// first violation wins, so a caller always sees a single stable message.
pub fn validate(raw: RawComplaint) -> Result<ComplaintSubmission, ValidationError> {
    let problem_chars = raw.problem.chars().count();
    if problem_chars < PROBLEM_MIN_CHARS {
        return Err(ValidationError::new(
            "problem",
            format!("Please describe your problem in at least {PROBLEM_MIN_CHARS} characters."),
        ));
    }
    if problem_chars > PROBLEM_MAX_CHARS {
        return Err(ValidationError::new(
            "problem",
            format!("Please keep your problem description under {PROBLEM_MAX_CHARS} characters."),
        ));
    }

    let email = if raw.email.is_empty() {
        None
    } else if EMAIL_RE.is_match(&raw.email) {
        Some(raw.email)
    } else {
        return Err(ValidationError::new(
            "email",
            "Please enter a valid email address.",
        ));
    };

    Ok(ComplaintSubmission {
        problem: raw.problem,
        email,
        received_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(problem: &str, email: &str) -> RawComplaint {
        RawComplaint {
            problem: problem.to_string(),
            email: email.to_string(),
        }
    }

    const VALID_PROBLEM: &str = "My landlord shut off my water for two weeks without notice.";

    #[test]
    fn valid_submission_with_email() {
        let submission = validate(raw(VALID_PROBLEM, "a@b.com")).unwrap();
        assert_eq!(submission.problem, VALID_PROBLEM);
        assert_eq!(submission.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn empty_email_means_not_provided() {
        let submission = validate(raw(VALID_PROBLEM, "")).unwrap();
        assert!(submission.email.is_none());
    }

    #[test]
    fn problem_too_short_references_minimum() {
        let err = validate(raw("too short", "")).unwrap_err();
        assert_eq!(err.field, "problem");
        assert!(err.message.contains("20"));
    }

    #[test]
    fn problem_too_long_references_maximum() {
        let err = validate(raw(&"x".repeat(6000), "")).unwrap_err();
        assert_eq!(err.field, "problem");
        assert!(err.message.contains("5000"));
    }

    #[test]
    fn problem_length_bounds_are_inclusive() {
        assert!(validate(raw(&"x".repeat(20), "")).is_ok());
        assert!(validate(raw(&"x".repeat(5000), "")).is_ok());
        assert!(validate(raw(&"x".repeat(19), "")).is_err());
        assert!(validate(raw(&"x".repeat(5001), "")).is_err());
    }

    #[test]
    fn problem_length_counts_chars_not_bytes() {
        // 20 multibyte chars is exactly at the minimum
        assert!(validate(raw(&"é".repeat(20), "")).is_ok());
    }

    #[test]
    fn malformed_email_rejected() {
        let err = validate(raw(VALID_PROBLEM, "not-an-email")).unwrap_err();
        assert_eq!(err.field, "email");
        assert!(err.message.to_lowercase().contains("email"));
    }

    #[test]
    fn email_without_tld_rejected() {
        assert!(validate(raw(VALID_PROBLEM, "user@host")).is_err());
        assert!(validate(raw(VALID_PROBLEM, "user@host.com")).is_ok());
    }

    #[test]
    fn problem_error_wins_over_email_error() {
        // Both fields invalid — problem is declared first, so its message surfaces.
        let err = validate(raw("short", "not-an-email")).unwrap_err();
        assert_eq!(err.field, "problem");
    }
}
