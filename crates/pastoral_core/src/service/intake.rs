//! Lecturer concern intake.
//!
//! # Responsibility
//! - Validate concern submissions and store them as `new` intake records.
//!
//! # Invariants
//! - New records are prepended; the intake list stays most-recent-first.
//! - Submission never creates a case or a timeline entry.

use crate::model::document::{Document, IntakeRecord, UNKNOWN_LECTURER};
use crate::service::validation::{non_blank, require_present, ValidationError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Concern submission as received from a lecturer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeInput {
    pub student_email: String,
    #[serde(default)]
    pub lecturer_name: Option<String>,
    pub summary: String,
}

impl IntakeInput {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present(&[
            ("studentEmail", self.student_email.as_str()),
            ("summary", self.summary.as_str()),
        ])
    }

    fn to_record(&self, submitted_at: DateTime<Utc>) -> IntakeRecord {
        let lecturer_name = non_blank(self.lecturer_name.as_deref()).unwrap_or(UNKNOWN_LECTURER);
        IntakeRecord::new(
            self.student_email.trim(),
            lecturer_name,
            self.summary.as_str(),
            submitted_at,
        )
    }
}

/// Validates `input` and prepends the resulting record to the intake queue.
pub fn submit(
    document: &mut Document,
    input: &IntakeInput,
    now: DateTime<Utc>,
) -> Result<IntakeRecord, ValidationError> {
    input.validate()?;
    let record = input.to_record(now);
    document.intake_queue.insert(0, record.clone());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::{submit, IntakeInput};
    use crate::model::document::{Document, INTAKE_STATUS_NEW, UNKNOWN_LECTURER};
    use chrono::Utc;

    #[test]
    fn blank_lecturer_defaults_and_record_is_prepended() {
        let mut doc = Document::default();
        let first = IntakeInput {
            student_email: "a@student.example".to_string(),
            lecturer_name: Some("Dr Byrne".to_string()),
            summary: "Missed two labs".to_string(),
        };
        let second = IntakeInput {
            student_email: "b@student.example".to_string(),
            lecturer_name: Some(" ".to_string()),
            summary: "Seemed withdrawn".to_string(),
        };

        submit(&mut doc, &first, Utc::now()).unwrap();
        let record = submit(&mut doc, &second, Utc::now()).unwrap();

        assert_eq!(record.lecturer_name, UNKNOWN_LECTURER);
        assert_eq!(record.status, INTAKE_STATUS_NEW);
        assert!(record.id.starts_with("intake-"));
        assert_eq!(doc.intake_queue[0].id, record.id);
        assert_eq!(doc.intake_queue.len(), 2);
    }

    #[test]
    fn missing_summary_is_rejected() {
        let mut doc = Document::default();
        let input = IntakeInput {
            student_email: "a@student.example".to_string(),
            lecturer_name: None,
            summary: String::new(),
        };

        let err = submit(&mut doc, &input, Utc::now()).unwrap_err();
        assert_eq!(err.fields, vec!["summary"]);
        assert!(doc.intake_queue.is_empty());
    }
}
