//! Case lifecycle and queue engine for pastoral care.
//! This crate is the single source of truth for case invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingConfig,
};
pub use model::case::{Case, CaseId, CaseStatus, ReasonCode, TimelineEntry, TimelineEntryKind};
pub use model::document::{
    Document, EmailMessage, IntakeRecord, Student, User, EMAIL_STATUS_UNMATCHED,
    INTAKE_STATUS_NEW, UNKNOWN_LECTURER,
};
pub use model::due::{DueDate, DueDateParseError, DueMoment};
pub use repo::document_repo::{
    seed_if_empty, DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository,
};
pub use repo::json_file_repo::JsonFileDocumentRepository;
pub use service::case_service::{
    AdvisorDashboard, CaseService, ServiceError, ServiceResult, TriageDashboard,
};
pub use service::decorator::{
    decorate, decorate_all, CaseView, Directory, StaffSummary, StudentSummary, TimelineEntryView,
};
pub use service::intake::IntakeInput;
pub use service::lifecycle::CloseOutcome;
pub use service::queue::{
    filter, project, resolve_active, summarize, QueueFilter, QueueItem, QueueSummary,
};
pub use service::timeline::NoteInput;
pub use service::validation::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
