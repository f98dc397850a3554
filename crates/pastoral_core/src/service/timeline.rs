//! Timeline note appends and follow-up rescheduling.
//!
//! # Responsibility
//! - Validate note submissions.
//! - Prepend note entries and apply the optional follow-up date.
//!
//! # Invariants
//! - This is the only writer of timeline content; existing entries are
//!   never edited or removed.
//! - A supplied follow-up date moves `follow_up_date` and `next_action_due`
//!   together.

use crate::model::case::{Case, TimelineEntry};
use crate::model::due::DueDate;
use crate::service::validation::{non_blank, require_present, ValidationError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Note submission as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub author_id: String,
    pub content: String,
    /// Blank means "leave the schedule alone".
    #[serde(default)]
    pub follow_up_date: Option<String>,
}

/// Note submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNote {
    author_id: String,
    content: String,
    follow_up: Option<DueDate>,
}

impl ValidatedNote {
    pub fn follow_up(&self) -> Option<&DueDate> {
        self.follow_up.as_ref()
    }
}

impl NoteInput {
    /// Checks required fields and parses the follow-up date.
    ///
    /// # Errors
    /// - `content`/`authorId` blank.
    /// - `followUpDate` present but not a date or timestamp.
    pub fn validate(&self) -> Result<ValidatedNote, ValidationError> {
        require_present(&[
            ("content", self.content.as_str()),
            ("authorId", self.author_id.as_str()),
        ])?;

        let follow_up = non_blank(self.follow_up_date.as_deref())
            .map(DueDate::parse)
            .transpose()
            .map_err(|err| ValidationError::invalid("followUpDate", err.to_string()))?;

        Ok(ValidatedNote {
            author_id: self.author_id.clone(),
            content: self.content.clone(),
            follow_up,
        })
    }
}

/// Prepends a note entry to `case` and applies its follow-up date.
///
/// Returns the id of the new entry.
pub fn apply_note(case: &mut Case, note: ValidatedNote, now: DateTime<Utc>) -> String {
    let entry = TimelineEntry::note(note.author_id, note.content, now);
    let entry_id = entry.id.clone();
    case.prepend_entry(entry);
    if let Some(due) = note.follow_up {
        case.reschedule(due);
    }
    entry_id
}

/// Validates `input` and applies it to `case` in one step.
pub fn add_note(
    case: &mut Case,
    input: &NoteInput,
    now: DateTime<Utc>,
) -> Result<String, ValidationError> {
    let note = input.validate()?;
    Ok(apply_note(case, note, now))
}

#[cfg(test)]
mod tests {
    use super::{add_note, NoteInput};
    use crate::model::case::{Case, CaseStatus, TimelineEntryKind};
    use crate::model::due::DueDate;
    use chrono::Utc;

    fn open_case() -> Case {
        Case {
            id: "case-7".to_string(),
            student_id: "stu-1".to_string(),
            advisor_id: "adv-lee".to_string(),
            owner_id: "coord-1".to_string(),
            status: CaseStatus::Open,
            reasons: Vec::new(),
            overview: String::new(),
            email_alias: String::new(),
            next_action_due: None,
            follow_up_date: None,
            timeline: Vec::new(),
        }
    }

    #[test]
    fn note_without_follow_up_keeps_schedule() {
        let mut case = open_case();
        case.next_action_due = Some(DueDate::parse("2024-05-01").unwrap());
        let input = NoteInput {
            author_id: "adv-lee".to_string(),
            content: "Left voicemail".to_string(),
            follow_up_date: Some("   ".to_string()),
        };

        add_note(&mut case, &input, Utc::now()).unwrap();

        assert_eq!(case.timeline.len(), 1);
        assert_eq!(case.timeline[0].kind, TimelineEntryKind::Note);
        assert_eq!(case.follow_up_date, None);
        assert_eq!(case.next_action_due.as_ref().map(DueDate::as_str), Some("2024-05-01"));
    }

    #[test]
    fn malformed_follow_up_is_rejected_without_mutation() {
        let mut case = open_case();
        let input = NoteInput {
            author_id: "adv-lee".to_string(),
            content: "Call back".to_string(),
            follow_up_date: Some("soon".to_string()),
        };

        let err = add_note(&mut case, &input, Utc::now()).unwrap_err();
        assert!(err.has_field("followUpDate"));
        assert!(case.timeline.is_empty());
    }
}
