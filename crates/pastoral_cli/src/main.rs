//! Command-line front end for the pastoral care case engine.
//!
//! # Responsibility
//! - Map subcommands onto `CaseService` operations and print JSON results.
//! - Keep queue filter and active-case selection as explicit arguments.

mod config;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::{AppConfig, StoreKind};
use log::error;
use pastoral_core::db::open_db;
use pastoral_core::{
    filter, init_logging_with, resolve_active, seed_if_empty, CaseService, Document,
    DocumentRepository, IntakeInput, JsonFileDocumentRepository, NoteInput, QueueFilter, QueueItem,
    QueueSummary, RepoError, ServiceError, SqliteDocumentRepository,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pastoral", version, about = "Pastoral care case queues")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create the document store when none exists, optionally seeding it.
    Init {
        /// JSON document stored when the target store is still empty.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Coordinator triage queue across all cases.
    Triage {
        #[command(flatten)]
        view: QueueArgs,
    },
    /// Queue of cases assigned to one advisor.
    Advisor {
        advisor_id: String,
        #[command(flatten)]
        view: QueueArgs,
    },
    /// Show one decorated case.
    Case { case_id: String },
    /// Append a note, optionally rescheduling the follow-up.
    AddNote {
        case_id: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        content: String,
        /// YYYY-MM-DD or RFC 3339 timestamp.
        #[arg(long)]
        follow_up: Option<String>,
    },
    /// Close a case.
    Close { case_id: String },
    /// Record a lecturer concern.
    Intake {
        #[arg(long)]
        student_email: String,
        #[arg(long)]
        lecturer: Option<String>,
        #[arg(long)]
        summary: String,
    },
    /// List the forwarded email inbox.
    Inbox,
}

#[derive(Debug, Clone, clap::Args)]
struct QueueArgs {
    /// all|today|overdue
    #[arg(long, default_value = "today")]
    filter: QueueFilter,
    /// Calendar day used for filters and counters (defaults to the local date).
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Currently selected case id, kept when still listed.
    #[arg(long)]
    active: Option<String>,
}

impl QueueArgs {
    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueView {
    filter: QueueFilter,
    today: NaiveDate,
    active_case_id: Option<String>,
    summary: QueueSummary,
    queue: Vec<QueueItem>,
}

impl QueueView {
    fn build(args: &QueueArgs, queue: &[QueueItem], summary: QueueSummary) -> Self {
        let today = args.today();
        let filtered = filter(queue, args.filter, today);
        Self {
            filter: args.filter,
            today,
            active_case_id: resolve_active(&filtered, args.active.as_deref()),
            summary,
            queue: filtered,
        }
    }
}

#[derive(Debug)]
enum CliError {
    Config(String),
    Service(ServiceError),
    Output(serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Service(err) => err.code(),
            Self::Output(_) => "output_error",
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Service(ServiceError::Validation(_)) => 2,
            Self::Service(ServiceError::CaseNotFound(_)) => 3,
            Self::Service(ServiceError::Storage(RepoError::Conflict { .. })) => 4,
            _ => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "{message}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "{err}"),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Service(ServiceError::Storage(value))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error error_code={}", err.code());
            eprintln!("{}", json!({ "error": err.code(), "message": err.to_string() }));
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    if let Some(logging) = cli.config.logging().map_err(CliError::Config)? {
        init_logging_with(logging).map_err(CliError::Config)?;
    }

    let seed = match &cli.command {
        Command::Init { seed: Some(path) } => Some(JsonFileDocumentRepository::new(path).load()?),
        _ => None,
    };

    let value = match cli.config.store {
        StoreKind::Json => {
            let repo = JsonFileDocumentRepository::new(&cli.config.data_path);
            if let Command::Init { .. } = cli.command {
                let created = repo.create_if_missing()?;
                let revision = initialize(&repo, seed)?;
                json!({
                    "store": "json",
                    "path": repo.path(),
                    "created": created,
                    "revision": revision,
                })
            } else {
                execute(&CaseService::new(repo), &cli.command)?
            }
        }
        StoreKind::Sqlite => {
            let conn = open_db(&cli.config.data_path)?;
            let repo = SqliteDocumentRepository::try_new(&conn)?;
            if let Command::Init { .. } = cli.command {
                let revision = initialize(&repo, seed)?;
                json!({ "store": "sqlite", "path": cli.config.data_path, "revision": revision })
            } else {
                execute(&CaseService::new(repo), &cli.command)?
            }
        }
    };

    Ok(serde_json::to_string_pretty(&value)?)
}

/// Seeds an empty store and reports the stored revision.
fn initialize<R: DocumentRepository>(repo: &R, seed: Option<Document>) -> Result<u64, CliError> {
    if let Some(seed) = seed {
        if let Some(revision) = seed_if_empty(repo, seed)? {
            return Ok(revision);
        }
    }
    Ok(repo.load()?.revision)
}

fn execute<R: DocumentRepository>(
    service: &CaseService<R>,
    command: &Command,
) -> Result<Value, CliError> {
    let value = match command {
        Command::Init { .. } => Value::Null,
        Command::Triage { view } => {
            let dashboard = service.get_triage_queue(view.today())?;
            let queue = QueueView::build(view, &dashboard.queue, dashboard.summary);
            json!({
                "view": queue,
                "cases": dashboard.cases,
                "intakeQueue": dashboard.intake_queue,
                "unmatchedEmails": dashboard.unmatched_emails,
            })
        }
        Command::Advisor { advisor_id, view } => {
            let dashboard = service.get_advisor_queue(advisor_id, view.today())?;
            let queue = QueueView::build(view, &dashboard.queue, dashboard.summary);
            json!({
                "advisorId": dashboard.advisor_id,
                "view": queue,
                "cases": dashboard.cases,
            })
        }
        Command::Case { case_id } => serde_json::to_value(service.get_case(case_id)?)?,
        Command::AddNote {
            case_id,
            author,
            content,
            follow_up,
        } => {
            let input = NoteInput {
                author_id: author.clone(),
                content: content.clone(),
                follow_up_date: follow_up.clone(),
            };
            serde_json::to_value(service.add_note(case_id, &input)?)?
        }
        Command::Close { case_id } => serde_json::to_value(service.close_case(case_id)?)?,
        Command::Intake {
            student_email,
            lecturer,
            summary,
        } => {
            let input = IntakeInput {
                student_email: student_email.clone(),
                lecturer_name: lecturer.clone(),
                summary: summary.clone(),
            };
            serde_json::to_value(service.submit_intake(&input)?)?
        }
        Command::Inbox => serde_json::to_value(service.list_inbox()?)?,
    };
    Ok(value)
}
