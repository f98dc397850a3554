//! Due values used by `nextActionDue` and `followUpDate`.
//!
//! # Responsibility
//! - Parse the date forms found in stored documents and note submissions.
//! - Answer the calendar questions the queue filters ask ("due today?",
//!   "due before the start of today?") in local time.
//!
//! # Invariants
//! - A value serializes back in the same form it was parsed from: a bare
//!   date stays a bare date, an offset timestamp keeps its offset.
//! - Bare dates and naive timestamps are interpreted in local time.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DAY_FORMAT: &str = "%Y-%m-%d";
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Error returned when a due value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDateParseError {
    value: String,
}

impl Display for DueDateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid due date `{}`; expected YYYY-MM-DD or an RFC 3339 timestamp",
            self.value
        )
    }
}

impl Error for DueDateParseError {}

/// Parsed reading of a due value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DueMoment {
    /// Whole calendar day, e.g. `2024-06-01`.
    Day(NaiveDate),
    /// Wall-clock time without offset, e.g. `2024-06-01T09:30`.
    Local(NaiveDateTime),
    /// Timestamp with explicit offset, e.g. `2024-06-01T09:30:00Z`.
    At(DateTime<FixedOffset>),
}

/// A calendar date or point in time at which the next action on a case falls due.
///
/// Keeps the text it was parsed from so a document written back to storage
/// carries every untouched due value byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DueDate {
    moment: DueMoment,
    text: String,
}

impl DueDate {
    /// Parses a due value from user or storage input.
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Result<Self, DueDateParseError> {
        let trimmed = value.trim();
        let moment = parse_moment(trimmed).ok_or_else(|| DueDateParseError {
            value: trimmed.to_string(),
        })?;
        Ok(Self {
            moment,
            text: trimmed.to_string(),
        })
    }

    /// Whole-day value written as `YYYY-MM-DD`.
    pub fn day(day: NaiveDate) -> Self {
        Self {
            moment: DueMoment::Day(day),
            text: day.format(DAY_FORMAT).to_string(),
        }
    }

    /// Local wall-clock value written as `YYYY-MM-DDTHH:MM:SS`.
    pub fn local(local: NaiveDateTime) -> Self {
        Self {
            moment: DueMoment::Local(local),
            text: local.format(LOCAL_FORMATS[0]).to_string(),
        }
    }

    /// Offset timestamp written as RFC 3339.
    pub fn at(at: DateTime<FixedOffset>) -> Self {
        Self {
            moment: DueMoment::At(at),
            text: at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    pub fn moment(&self) -> DueMoment {
        self.moment
    }

    /// Text form used on the wire.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Local wall-clock instant this value refers to.
    ///
    /// Bare days resolve to local midnight.
    pub fn local_naive(&self) -> NaiveDateTime {
        match self.moment {
            DueMoment::Day(day) => day.and_time(NaiveTime::MIN),
            DueMoment::Local(local) => local,
            DueMoment::At(at) => at.with_timezone(&Local).naive_local(),
        }
    }

    /// Local calendar day this value falls on.
    pub fn local_day(&self) -> NaiveDate {
        match self.moment {
            DueMoment::Day(day) => day,
            _ => self.local_naive().date(),
        }
    }

    /// Whether the value falls on `day` in local time.
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.local_day() == day
    }

    /// Whether the value is strictly before 00:00:00 local time on `day`.
    pub fn is_before_start_of(&self, day: NaiveDate) -> bool {
        self.local_naive() < day.and_time(NaiveTime::MIN)
    }

    /// Chronological comparison in local time.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.local_naive().cmp(&other.local_naive())
    }
}

fn parse_moment(value: &str) -> Option<DueMoment> {
    if let Ok(day) = NaiveDate::parse_from_str(value, DAY_FORMAT) {
        return Some(DueMoment::Day(day));
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(DueMoment::At(at));
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(DueMoment::Local)
}

impl Display for DueDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for DueDate {
    type Error = DueDateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<DueDate> for String {
    fn from(value: DueDate) -> Self {
        value.text
    }
}

#[cfg(test)]
mod tests {
    use super::{DueDate, DueMoment};
    use crate::model::case::Case;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_bare_day_and_round_trips_text() {
        let due = DueDate::parse("2024-06-01").unwrap();
        assert_eq!(due, DueDate::day(day(2024, 6, 1)));
        assert_eq!(due.to_string(), "2024-06-01");
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        assert!(matches!(
            DueDate::parse("2024-06-01T09:30:00.000Z").unwrap().moment(),
            DueMoment::At(_)
        ));
        assert!(matches!(
            DueDate::parse("2024-06-01T09:30").unwrap().moment(),
            DueMoment::Local(_)
        ));
    }

    #[test]
    fn rejects_garbage() {
        let err = DueDate::parse("next tuesday").unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn day_calendar_checks_use_local_day() {
        let due = DueDate::parse("2024-06-01").unwrap();
        assert!(due.is_on(day(2024, 6, 1)));
        assert!(!due.is_before_start_of(day(2024, 6, 1)));
        assert!(due.is_before_start_of(day(2024, 6, 2)));
    }

    #[test]
    fn naive_timestamp_later_in_day_is_not_overdue_today() {
        let due = DueDate::parse("2024-06-01T23:59").unwrap();
        assert!(due.is_on(day(2024, 6, 1)));
        assert!(!due.is_before_start_of(day(2024, 6, 1)));
    }

    #[test]
    fn timestamps_keep_their_written_form() {
        for text in [
            "2024-06-01T09:30",
            "2024-06-01T09:30:00.750",
            "2024-05-14T12:00:00.000Z",
            "2024-05-14T13:00:00+01:00",
        ] {
            let due = DueDate::parse(text).unwrap();
            assert_eq!(due.to_string(), text);
            assert_eq!(String::from(due), text);
        }
    }

    #[test]
    fn untouched_due_values_survive_a_document_rewrite() {
        let raw = r#"{
            "id": "case-9",
            "studentId": "stu-1",
            "status": "open",
            "emailAlias": "case-9@care.example",
            "nextActionDue": "2024-05-14T12:00:00.000Z",
            "followUpDate": "2024-06-01T09:30:00.750"
        }"#;
        let case: Case = serde_json::from_str(raw).unwrap();
        let written = serde_json::to_value(&case).unwrap();

        assert_eq!(written["nextActionDue"], "2024-05-14T12:00:00.000Z");
        assert_eq!(written["followUpDate"], "2024-06-01T09:30:00.750");
    }

    #[test]
    fn constructed_values_use_canonical_text() {
        let local = day(2024, 6, 1).and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(DueDate::local(local).as_str(), "2024-06-01T09:30:00");
        assert_eq!(DueDate::day(day(2024, 6, 1)).as_str(), "2024-06-01");
    }
}
