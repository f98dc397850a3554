//! Case and timeline domain model.
//!
//! # Responsibility
//! - Define the stored case record and its append-only timeline.
//! - Provide the state transitions that touch case fields directly.
//!
//! # Invariants
//! - Closing a case clears both `follow_up_date` and `next_action_due`.
//! - Rescheduling a follow-up sets `follow_up_date` and `next_action_due`
//!   to the same value in one step.
//! - Timeline entries are never edited or removed.

use super::due::DueDate;
use super::generate_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable case identifier.
pub type CaseId = String;

/// Case lifecycle state. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Closed,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Why a case needs attention.
///
/// Codes outside the known set are kept verbatim so they survive a
/// load/save cycle and can still be shown with a fallback label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReasonCode {
    MissedSubmission,
    UnansweredMessage,
    EcDeadline,
    NoActivity14d,
    Unrecognized(String),
}

impl ReasonCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissedSubmission => "missed_submission",
            Self::UnansweredMessage => "unanswered_message",
            Self::EcDeadline => "ec_deadline",
            Self::NoActivity14d => "no_activity_14d",
            Self::Unrecognized(code) => code.as_str(),
        }
    }

    /// Human-facing label; unknown codes fall back to the raw code.
    pub fn label(&self) -> &str {
        match self {
            Self::MissedSubmission => "Missed submission",
            Self::UnansweredMessage => "Awaiting reply",
            Self::EcDeadline => "EC evidence due",
            Self::NoActivity14d => "No activity (14d)",
            Self::Unrecognized(code) => code.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for ReasonCode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "missed_submission" => Self::MissedSubmission,
            "unanswered_message" => Self::UnansweredMessage,
            "ec_deadline" => Self::EcDeadline,
            "no_activity_14d" => Self::NoActivity14d,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<ReasonCode> for String {
    fn from(value: ReasonCode) -> Self {
        match value {
            ReasonCode::Unrecognized(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

/// Kind of interaction recorded on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEntryKind {
    Note,
    EmailOut,
    EmailIn,
    Meeting,
    Concern,
}

impl TimelineEntryKind {
    /// Heading used when rendering an entry of this kind.
    pub fn title(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::EmailOut => "Email sent",
            Self::EmailIn => "Email received",
            Self::Meeting => "Meeting",
            Self::Concern => "Lecturer concern",
        }
    }
}

/// One immutable record of interaction on a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    /// Serialized as `type` to match the stored document.
    #[serde(rename = "type")]
    pub kind: TimelineEntryKind,
    /// Creation time. Never changes after the entry is written.
    pub timestamp: DateTime<Utc>,
    pub author_id: String,
    pub summary: String,
}

impl TimelineEntry {
    /// Creates a note entry with a generated `tl-` id.
    pub fn note(
        author_id: impl Into<String>,
        summary: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id("tl"),
            kind: TimelineEntryKind::Note,
            timestamp,
            author_id: author_id.into(),
            summary: summary.into(),
        }
    }
}

/// Stored case record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    /// Weak reference to `Document::students`.
    pub student_id: String,
    /// Weak reference to `Document::users`.
    #[serde(default)]
    pub advisor_id: String,
    /// Weak reference to `Document::users`.
    #[serde(default)]
    pub owner_id: String,
    pub status: CaseStatus,
    #[serde(default)]
    pub reasons: Vec<ReasonCode>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub email_alias: String,
    /// Sort and filter key for every queue.
    #[serde(default)]
    pub next_action_due: Option<DueDate>,
    /// Advisor-chosen next check date.
    #[serde(default)]
    pub follow_up_date: Option<DueDate>,
    /// Stored in append order; newest notes are prepended.
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Case {
    pub fn is_open(&self) -> bool {
        self.status == CaseStatus::Open
    }

    /// Places `entry` at the front of the timeline.
    pub fn prepend_entry(&mut self, entry: TimelineEntry) {
        self.timeline.insert(0, entry);
    }

    /// Sets the follow-up date and the next action due date together.
    pub fn reschedule(&mut self, due: DueDate) {
        self.follow_up_date = Some(due.clone());
        self.next_action_due = Some(due);
    }

    /// Moves the case to `Closed` and drops it out of every due-date queue.
    ///
    /// Returns `true` when the status actually changed. Closing a closed case
    /// re-applies the same effect.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.status = CaseStatus::Closed;
        self.follow_up_date = None;
        self.next_action_due = None;
        was_open
    }
}

#[cfg(test)]
mod tests {
    use super::{ReasonCode, TimelineEntryKind};

    #[test]
    fn reason_codes_map_known_and_keep_unknown() {
        assert_eq!(
            ReasonCode::from("ec_deadline".to_string()),
            ReasonCode::EcDeadline
        );
        let unknown = ReasonCode::from("wellbeing_flag".to_string());
        assert!(!unknown.is_recognized());
        assert_eq!(unknown.label(), "wellbeing_flag");
        assert_eq!(String::from(unknown), "wellbeing_flag");
    }

    #[test]
    fn entry_kind_titles_cover_every_kind() {
        assert_eq!(TimelineEntryKind::EmailOut.title(), "Email sent");
        assert_eq!(TimelineEntryKind::EmailIn.title(), "Email received");
        assert_eq!(TimelineEntryKind::Concern.title(), "Lecturer concern");
    }
}
