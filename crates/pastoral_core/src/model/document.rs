//! Whole-document model and reference records.
//!
//! # Responsibility
//! - Define the single unit that is loaded and saved by repositories.
//! - Provide id lookups used by decoration and state transitions.
//!
//! # Invariants
//! - `revision` only changes inside repositories, on successful save.
//! - Lookups never fail; a dangling reference yields `None`.

use super::case::Case;
use super::generate_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status assigned to freshly submitted intake records.
pub const INTAKE_STATUS_NEW: &str = "new";
/// Inbox status for messages that are not linked to a case yet.
pub const EMAIL_STATUS_UNMATCHED: &str = "unmatched";
/// Lecturer name stored when the submitter leaves it blank.
pub const UNKNOWN_LECTURER: &str = "Unknown lecturer";

/// Student reference record. Read-only for the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
}

/// Advisor, coordinator or other staff member. Read-only for the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Lecturer-submitted concern awaiting triage into a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub id: String,
    pub student_email: String,
    #[serde(default)]
    pub lecturer_name: String,
    pub summary: String,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
}

impl IntakeRecord {
    /// Creates a `new` record with a generated `intake-` id.
    pub fn new(
        student_email: impl Into<String>,
        lecturer_name: impl Into<String>,
        summary: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id("intake"),
            student_email: student_email.into(),
            lecturer_name: lecturer_name.into(),
            summary: summary.into(),
            submitted_at,
            status: INTAKE_STATUS_NEW.to_string(),
        }
    }
}

/// Forwarded email as delivered by the upstream mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
}

impl EmailMessage {
    pub fn is_unmatched(&self) -> bool {
        self.status == EMAIL_STATUS_UNMATCHED
    }
}

/// The whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Optimistic concurrency stamp maintained by repositories.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub cases: Vec<Case>,
    /// Most recent first.
    #[serde(default)]
    pub intake_queue: Vec<IntakeRecord>,
    #[serde(default)]
    pub email_inbox: Vec<EmailMessage>,
}

impl Document {
    pub fn find_case(&self, case_id: &str) -> Option<&Case> {
        self.cases.iter().find(|case| case.id == case_id)
    }

    pub fn find_case_mut(&mut self, case_id: &str) -> Option<&mut Case> {
        self.cases.iter_mut().find(|case| case.id == case_id)
    }

    pub fn find_student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == student_id)
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    /// Inbox messages not yet linked to any case.
    pub fn unmatched_emails(&self) -> Vec<EmailMessage> {
        self.email_inbox
            .iter()
            .filter(|message| message.is_unmatched())
            .cloned()
            .collect()
    }
}
