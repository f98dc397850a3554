//! Queue projection over decorated cases.
//!
//! # Responsibility
//! - Order cases by `next_action_due` into the canonical queue order.
//! - Filter and summarize a queue for a given calendar day.
//! - Keep the "active case" selection an explicit input/output.
//!
//! # Invariants
//! - Ascending by due date; items without a due date sort last; ties keep
//!   input order.
//! - Filtering never reorders and never mutates the input queue.
//! - `today` and `overdue` are disjoint and both exclude items without a
//!   due date.

use crate::model::case::{CaseStatus, ReasonCode};
use crate::model::due::DueDate;
use crate::service::decorator::CaseView;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One row of a triage or advisor queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub status: CaseStatus,
    pub student_name: Option<String>,
    pub next_action_due: Option<DueDate>,
    pub reasons: Vec<ReasonCode>,
    pub overview: String,
    pub advisor_name: Option<String>,
    pub advisor_email: Option<String>,
    pub owner_email: Option<String>,
    pub email_alias: String,
}

impl QueueItem {
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.next_action_due
            .as_ref()
            .is_some_and(|due| due.is_on(today))
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.next_action_due
            .as_ref()
            .is_some_and(|due| due.is_before_start_of(today))
    }

    pub fn has_reason(&self, reason: &ReasonCode) -> bool {
        self.reasons.contains(reason)
    }
}

impl From<&CaseView> for QueueItem {
    fn from(view: &CaseView) -> Self {
        Self {
            id: view.id.clone(),
            status: view.status,
            student_name: view.student.as_ref().map(|student| student.name.clone()),
            next_action_due: view.next_action_due.clone(),
            reasons: view.reasons.clone(),
            overview: view.overview.clone(),
            advisor_name: view.advisor.as_ref().map(|advisor| advisor.name.clone()),
            advisor_email: view.advisor.as_ref().map(|advisor| advisor.email.clone()),
            owner_email: view.owner.as_ref().map(|owner| owner.email.clone()),
            email_alias: view.email_alias.clone(),
        }
    }
}

/// Queue filter selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueFilter {
    All,
    #[default]
    Today,
    Overdue,
}

impl QueueFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Overdue => "overdue",
        }
    }

    /// Whether `item` passes this filter on `today`.
    pub fn matches(self, item: &QueueItem, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Today => item.is_due_on(today),
            Self::Overdue => item.is_overdue(today),
        }
    }
}

impl Display for QueueFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "overdue" => Ok(Self::Overdue),
            other => Err(format!(
                "unsupported queue filter `{other}`; expected all|today|overdue"
            )),
        }
    }
}

/// Counters shown above a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub open: usize,
    pub due_today: usize,
    pub overdue: usize,
    pub awaiting_reply: usize,
}

/// Orders optional due dates ascending with `None` last.
pub fn compare_due(a: Option<&DueDate>, b: Option<&DueDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.chronological_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts decorated cases into canonical queue order, in place.
pub fn sort_by_next_action(cases: &mut [CaseView]) {
    cases.sort_by(|a, b| compare_due(a.next_action_due.as_ref(), b.next_action_due.as_ref()));
}

/// Projects decorated cases into queue items in canonical queue order.
pub fn project(cases: &[CaseView]) -> Vec<QueueItem> {
    let mut queue: Vec<QueueItem> = cases.iter().map(QueueItem::from).collect();
    queue.sort_by(|a, b| compare_due(a.next_action_due.as_ref(), b.next_action_due.as_ref()));
    queue
}

/// Returns the items of `queue` that pass `mode` on `today`, in queue order.
pub fn filter(queue: &[QueueItem], mode: QueueFilter, today: NaiveDate) -> Vec<QueueItem> {
    queue
        .iter()
        .filter(|item| mode.matches(item, today))
        .cloned()
        .collect()
}

/// Counts open, due-today, overdue and awaiting-reply items.
pub fn summarize(queue: &[QueueItem], today: NaiveDate) -> QueueSummary {
    queue.iter().fold(QueueSummary::default(), |mut summary, item| {
        if item.status == CaseStatus::Open {
            summary.open += 1;
        }
        if item.is_due_on(today) {
            summary.due_today += 1;
        }
        if item.is_overdue(today) {
            summary.overdue += 1;
        }
        if item.has_reason(&ReasonCode::UnansweredMessage) {
            summary.awaiting_reply += 1;
        }
        summary
    })
}

/// Picks the case to show next to a filtered queue.
///
/// Keeps `current` while it is still listed, otherwise falls back to the
/// first item. Returns `None` for an empty list.
pub fn resolve_active(filtered: &[QueueItem], current: Option<&str>) -> Option<String> {
    current
        .filter(|id| filtered.iter().any(|item| item.id == *id))
        .or_else(|| filtered.first().map(|item| item.id.as_str()))
        .map(str::to_string)
}
