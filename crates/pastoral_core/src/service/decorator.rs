//! Case decoration: joins a stored case with the people it references.
//!
//! # Responsibility
//! - Resolve student, advisor and owner references into summaries.
//! - Resolve timeline author names and order the timeline newest first.
//!
//! # Invariants
//! - Pure projection: the same case and document always decorate identically.
//! - A dangling reference resolves to `None`; an unknown author falls back
//!   to the raw author id.
//! - The decorated timeline is non-increasing by timestamp whatever the
//!   stored order; entries with equal timestamps keep stored order.

use crate::model::case::{Case, CaseStatus, ReasonCode, TimelineEntry, TimelineEntryKind};
use crate::model::document::{Document, Student, User};
use crate::model::due::DueDate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Student fields exposed on a decorated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub course: Option<String>,
    pub stage: Option<String>,
    pub email: String,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            course: student.course.clone(),
            stage: student.stage.clone(),
            email: student.email.clone(),
        }
    }
}

/// Staff fields exposed on a decorated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
}

impl From<&User> for StaffSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            email: user.email.clone(),
        }
    }
}

/// Timeline entry with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntryView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TimelineEntryKind,
    pub timestamp: DateTime<Utc>,
    pub author_id: String,
    /// User name, or the raw author id when no user matches.
    pub author_name: String,
    pub summary: String,
}

impl TimelineEntryView {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Read model of a case, as returned by every case-level operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseView {
    pub id: String,
    pub status: CaseStatus,
    pub next_action_due: Option<DueDate>,
    pub follow_up_date: Option<DueDate>,
    pub reasons: Vec<ReasonCode>,
    pub overview: String,
    pub email_alias: String,
    pub student: Option<StudentSummary>,
    pub advisor: Option<StaffSummary>,
    pub owner: Option<StaffSummary>,
    /// Newest first.
    pub timeline: Vec<TimelineEntryView>,
}

/// Id index over the reference collections of one document.
pub struct Directory<'doc> {
    students: HashMap<&'doc str, &'doc Student>,
    users: HashMap<&'doc str, &'doc User>,
}

impl<'doc> Directory<'doc> {
    /// Indexes students and users by id. On duplicate ids the first record wins.
    pub fn new(document: &'doc Document) -> Self {
        let mut students = HashMap::with_capacity(document.students.len());
        for student in &document.students {
            students.entry(student.id.as_str()).or_insert(student);
        }
        let mut users = HashMap::with_capacity(document.users.len());
        for user in &document.users {
            users.entry(user.id.as_str()).or_insert(user);
        }
        Self { students, users }
    }

    pub fn student(&self, id: &str) -> Option<&'doc Student> {
        self.students.get(id).copied()
    }

    pub fn user(&self, id: &str) -> Option<&'doc User> {
        self.users.get(id).copied()
    }

    /// Decorates one case against this index.
    pub fn decorate(&self, case: &Case) -> CaseView {
        let mut timeline: Vec<TimelineEntryView> = case
            .timeline
            .iter()
            .map(|entry| self.decorate_entry(entry))
            .collect();
        timeline.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        CaseView {
            id: case.id.clone(),
            status: case.status,
            next_action_due: case.next_action_due.clone(),
            follow_up_date: case.follow_up_date.clone(),
            reasons: case.reasons.clone(),
            overview: case.overview.clone(),
            email_alias: case.email_alias.clone(),
            student: self.student(&case.student_id).map(StudentSummary::from),
            advisor: self.user(&case.advisor_id).map(StaffSummary::from),
            owner: self.user(&case.owner_id).map(StaffSummary::from),
            timeline,
        }
    }

    fn decorate_entry(&self, entry: &TimelineEntry) -> TimelineEntryView {
        let author_name = self
            .user(&entry.author_id)
            .map_or_else(|| entry.author_id.clone(), |user| user.name.clone());

        TimelineEntryView {
            id: entry.id.clone(),
            kind: entry.kind,
            timestamp: entry.timestamp,
            author_id: entry.author_id.clone(),
            author_name,
            summary: entry.summary.clone(),
        }
    }
}

/// Decorates a single case against `document`.
pub fn decorate(case: &Case, document: &Document) -> CaseView {
    Directory::new(document).decorate(case)
}

/// Decorates many cases, building the id index once.
pub fn decorate_all<'a>(
    cases: impl IntoIterator<Item = &'a Case>,
    document: &Document,
) -> Vec<CaseView> {
    let directory = Directory::new(document);
    cases
        .into_iter()
        .map(|case| directory.decorate(case))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decorate;
    use crate::model::case::{Case, CaseStatus, TimelineEntry, TimelineEntryKind};
    use crate::model::document::{Document, User};
    use chrono::{TimeZone, Utc};

    fn entry(id: &str, author: &str, hour: u32) -> TimelineEntry {
        TimelineEntry {
            id: id.to_string(),
            kind: TimelineEntryKind::EmailIn,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            author_id: author.to_string(),
            summary: format!("entry {id}"),
        }
    }

    fn document_with(case: Case) -> Document {
        Document {
            users: vec![User {
                id: "adv-lee".to_string(),
                name: "Dr Lee".to_string(),
                email: "lee@example.ac.uk".to_string(),
                role: "advisor".to_string(),
            }],
            cases: vec![case],
            ..Document::default()
        }
    }

    fn bare_case() -> Case {
        Case {
            id: "case-1".to_string(),
            student_id: "stu-missing".to_string(),
            advisor_id: "adv-lee".to_string(),
            owner_id: "nobody".to_string(),
            status: CaseStatus::Open,
            reasons: Vec::new(),
            overview: String::new(),
            email_alias: "case-1@care.example".to_string(),
            next_action_due: None,
            follow_up_date: None,
            timeline: vec![
                entry("a", "adv-lee", 8),
                entry("b", "ext-1", 12),
                entry("c", "adv-lee", 10),
            ],
        }
    }

    #[test]
    fn resolves_references_and_tolerates_dangling_ones() {
        let doc = document_with(bare_case());
        let view = decorate(&doc.cases[0], &doc);

        assert!(view.student.is_none());
        assert!(view.owner.is_none());
        assert_eq!(view.advisor.as_ref().map(|a| a.name.as_str()), Some("Dr Lee"));
    }

    #[test]
    fn timeline_is_newest_first_with_author_fallback() {
        let doc = document_with(bare_case());
        let view = decorate(&doc.cases[0], &doc);

        let ids: Vec<&str> = view.timeline.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(view.timeline[0].author_name, "ext-1");
        assert_eq!(view.timeline[1].author_name, "Dr Lee");
        assert_eq!(view.timeline[0].title(), "Email received");
    }
}
