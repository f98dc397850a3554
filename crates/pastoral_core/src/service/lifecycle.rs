//! Case lifecycle: `open` -> `closed`.
//!
//! # Invariants
//! - `closed` is terminal; there is no reopen transition.
//! - Closing clears both due fields, so a closed case never matches a
//!   due-date filter.
//! - Closing a closed case is accepted and re-applies the same effect.

use crate::model::case::Case;

/// What `close` observed about the case before applying the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    AlreadyClosed,
}

impl CloseOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::AlreadyClosed => "already_closed",
        }
    }
}

/// Closes `case`.
pub fn close(case: &mut Case) -> CloseOutcome {
    if case.close() {
        CloseOutcome::Closed
    } else {
        CloseOutcome::AlreadyClosed
    }
}
