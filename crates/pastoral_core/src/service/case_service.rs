//! Case use-case service.
//!
//! # Responsibility
//! - Expose the dashboard reads and case mutations to front ends.
//! - Map repository and validation failures into `ServiceError`.
//!
//! # Invariants
//! - Reads load the document once and never save.
//! - Mutations validate input before loading, apply one transition and save
//!   the whole document once; a failed save leaves storage unchanged.
//! - No call retries; a revision conflict surfaces as `ServiceError::Storage`.

use crate::model::case::Case;
use crate::model::document::{Document, EmailMessage, IntakeRecord};
use crate::repo::document_repo::{DocumentRepository, RepoError};
use crate::service::decorator::{decorate, decorate_all, CaseView};
use crate::service::intake::{self, IntakeInput};
use crate::service::lifecycle;
use crate::service::queue::{project, sort_by_next_action, summarize, QueueItem, QueueSummary};
use crate::service::timeline::{apply_note, NoteInput};
use crate::service::validation::ValidationError;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for case use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target case does not exist.
    CaseNotFound(String),
    /// Request input rejected; nothing was loaded or saved.
    Validation(ValidationError),
    /// Load or save failed.
    Storage(RepoError),
}

impl ServiceError {
    /// Stable machine-readable code for front ends.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CaseNotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Storage(RepoError::Conflict { .. }) => "conflict",
            Self::Storage(_) => "storage_failure",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CaseNotFound(case_id) => write!(f, "case not found: {case_id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CaseNotFound(_) => None,
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Coordinator-facing view over every case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageDashboard {
    pub queue: Vec<QueueItem>,
    /// Same order as `queue`.
    pub cases: Vec<CaseView>,
    pub intake_queue: Vec<IntakeRecord>,
    pub unmatched_emails: Vec<EmailMessage>,
    pub summary: QueueSummary,
}

/// One advisor's assigned cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorDashboard {
    pub advisor_id: String,
    pub queue: Vec<QueueItem>,
    /// Same order as `queue`.
    pub cases: Vec<CaseView>,
    pub summary: QueueSummary,
}

/// Facade over one document repository.
pub struct CaseService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> CaseService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds the triage dashboard. `today` drives the summary counters.
    pub fn get_triage_queue(&self, today: NaiveDate) -> ServiceResult<TriageDashboard> {
        let document = self.repo.load()?;
        let mut cases = decorate_all(&document.cases, &document);
        sort_by_next_action(&mut cases);
        let queue = project(&cases);
        let summary = summarize(&queue, today);

        Ok(TriageDashboard {
            queue,
            cases,
            intake_queue: document.intake_queue.clone(),
            unmatched_emails: document.unmatched_emails(),
            summary,
        })
    }

    /// Builds the dashboard for cases assigned to `advisor_id`.
    pub fn get_advisor_queue(
        &self,
        advisor_id: &str,
        today: NaiveDate,
    ) -> ServiceResult<AdvisorDashboard> {
        let document = self.repo.load()?;
        let assigned = document
            .cases
            .iter()
            .filter(|case| case.advisor_id == advisor_id);
        let mut cases = decorate_all(assigned, &document);
        sort_by_next_action(&mut cases);
        let queue = project(&cases);
        let summary = summarize(&queue, today);

        Ok(AdvisorDashboard {
            advisor_id: advisor_id.to_string(),
            queue,
            cases,
            summary,
        })
    }

    /// Gets one decorated case.
    pub fn get_case(&self, case_id: &str) -> ServiceResult<CaseView> {
        let document = self.repo.load()?;
        let case = document
            .find_case(case_id)
            .ok_or_else(|| ServiceError::CaseNotFound(case_id.to_string()))?;
        Ok(decorate(case, &document))
    }

    /// Appends a note and applies its optional follow-up date.
    pub fn add_note(&self, case_id: &str, input: &NoteInput) -> ServiceResult<CaseView> {
        let note = input.validate().map_err(|err| {
            warn!(
                "event=note_add module=service status=rejected case_id={case_id} fields={}",
                err.fields.join(",")
            );
            err
        })?;
        let rescheduled = note.follow_up().is_some();

        self.mutate_case(case_id, "note_add", |document| {
            let case = find_case_mut(document, case_id)?;
            let entry_id = apply_note(case, note, Utc::now());
            info!(
                "event=note_add module=service status=applied case_id={case_id} entry_id={entry_id} rescheduled={rescheduled}"
            );
            Ok(())
        })
    }

    /// Closes a case. Closing a closed case succeeds.
    pub fn close_case(&self, case_id: &str) -> ServiceResult<CaseView> {
        self.mutate_case(case_id, "case_close", |document| {
            let case = find_case_mut(document, case_id)?;
            let outcome = lifecycle::close(case);
            info!(
                "event=case_close module=service status=applied case_id={case_id} outcome={}",
                outcome.as_str()
            );
            Ok(())
        })
    }

    /// Stores a lecturer concern as a new intake record.
    pub fn submit_intake(&self, input: &IntakeInput) -> ServiceResult<IntakeRecord> {
        input.validate().map_err(|err| {
            warn!(
                "event=intake_submit module=service status=rejected fields={}",
                err.fields.join(",")
            );
            err
        })?;

        let mut document = self.repo.load()?;
        let record = intake::submit(&mut document, input, Utc::now())?;
        let revision = self.repo.save(&document)?;
        info!(
            "event=intake_submit module=service status=ok intake_id={} revision={revision}",
            record.id
        );
        Ok(record)
    }

    /// Lists the whole email inbox as stored.
    pub fn list_inbox(&self) -> ServiceResult<Vec<EmailMessage>> {
        Ok(self.repo.load()?.email_inbox)
    }

    fn mutate_case(
        &self,
        case_id: &str,
        event: &str,
        transition: impl FnOnce(&mut Document) -> ServiceResult<()>,
    ) -> ServiceResult<CaseView> {
        let mut document = self.repo.load()?;
        if let Err(err) = transition(&mut document) {
            warn!(
                "event={event} module=service status=error case_id={case_id} error_code={}",
                err.code()
            );
            return Err(err);
        }

        let revision = match self.repo.save(&document) {
            Ok(revision) => revision,
            Err(err) => {
                warn!(
                    "event={event} module=service status=error case_id={case_id} error_code=save_failed error={err}"
                );
                return Err(err.into());
            }
        };
        document.revision = revision;
        info!("event={event} module=service status=ok case_id={case_id} revision={revision}");

        let case = document
            .find_case(case_id)
            .ok_or_else(|| ServiceError::CaseNotFound(case_id.to_string()))?;
        Ok(decorate(case, &document))
    }
}

fn find_case_mut<'doc>(
    document: &'doc mut Document,
    case_id: &str,
) -> ServiceResult<&'doc mut Case> {
    document
        .find_case_mut(case_id)
        .ok_or_else(|| ServiceError::CaseNotFound(case_id.to_string()))
}
