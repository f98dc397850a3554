//! Document repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide `load`/`save` over one stored document.
//! - Detect lost updates with a revision compare-and-swap.
//!
//! # Invariants
//! - An empty store loads as an empty document at revision 0.
//! - A stale save returns `RepoError::Conflict` and writes nothing.
//! - Read paths reject corrupt bodies instead of masking them.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DOCUMENT_ROW_ID;
use crate::model::document::Document;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage failure while opening, loading or saving the document.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite error.
    Sqlite(rusqlite::Error),
    /// Database was written by a newer schema than this build knows.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// File system failure on the JSON store.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored document could not be decoded, or its revision cannot advance.
    InvalidData(String),
    /// Document could not be encoded for writing.
    Encode(serde_json::Error),
    /// Stored revision moved on since the document was loaded.
    Conflict { expected: u64, actual: u64 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Schema is current but the document row was removed.
    MissingDocumentRow,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "document store schema version {found} is newer than supported {supported}"
            ),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
            Self::Encode(err) => write!(f, "failed to encode document: {err}"),
            Self::Conflict { expected, actual } => write!(
                f,
                "document changed concurrently: loaded revision {expected}, stored revision {actual}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingDocumentRow => write!(f, "document row {DOCUMENT_ROW_ID} is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Load/save-whole-document store.
pub trait DocumentRepository {
    /// Returns the full current state, stamped with its stored revision.
    fn load(&self) -> RepoResult<Document>;
    /// Replaces the stored state and returns the new revision.
    ///
    /// Fails with `RepoError::Conflict` when `document.revision` is stale.
    fn save(&self, document: &Document) -> RepoResult<u64>;
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn load(&self) -> RepoResult<Document> {
        (**self).load()
    }

    fn save(&self, document: &Document) -> RepoResult<u64> {
        (**self).save(document)
    }
}

/// Stores `seed` when `repo` still holds the initial empty document.
///
/// Returns the new revision, or `None` when the store already has content.
pub fn seed_if_empty<R: DocumentRepository>(
    repo: &R,
    mut seed: Document,
) -> RepoResult<Option<u64>> {
    let current = repo.load()?;
    if current != Document::default() {
        info!(
            "event=document_seed module=repo status=skipped revision={}",
            current.revision
        );
        return Ok(None);
    }

    seed.revision = current.revision;
    let revision = repo.save(&seed)?;
    info!(
        "event=document_seed module=repo status=ok revision={revision} cases={}",
        seed.cases.len()
    );
    Ok(Some(revision))
}

/// Revision written by a save of a document loaded at `loaded`.
pub(crate) fn next_revision(loaded: u64) -> RepoResult<u64> {
    loaded
        .checked_add(1)
        .ok_or_else(|| RepoError::InvalidData(format!("revision {loaded} cannot advance")))
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection (see `db::open_db`).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_document_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn stored_revision(&self) -> RepoResult<u64> {
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM documents WHERE id = ?1;",
                [DOCUMENT_ROW_ID],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(RepoError::MissingDocumentRow)?;
        revision_from_db(revision)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn load(&self) -> RepoResult<Document> {
        let (revision, body) = self
            .conn
            .query_row(
                "SELECT revision, body FROM documents WHERE id = ?1;",
                [DOCUMENT_ROW_ID],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?
            .ok_or(RepoError::MissingDocumentRow)?;

        let mut document: Document = serde_json::from_str(&body)
            .map_err(|err| RepoError::InvalidData(format!("documents.body: {err}")))?;
        document.revision = revision_from_db(revision)?;
        Ok(document)
    }

    fn save(&self, document: &Document) -> RepoResult<u64> {
        let next = next_revision(document.revision)?;
        let mut stored = document.clone();
        stored.revision = next;
        let body = serde_json::to_string(&stored).map_err(RepoError::Encode)?;

        let updated = self.conn.execute(
            "UPDATE documents
             SET
                revision = ?1,
                body = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3 AND revision = ?4;",
            params![
                revision_to_db(next)?,
                body,
                DOCUMENT_ROW_ID,
                revision_to_db(document.revision)?
            ],
        )?;

        if updated == 0 {
            let actual = self.stored_revision()?;
            warn!(
                "event=document_save module=repo status=conflict store=sqlite expected_revision={} actual_revision={actual}",
                document.revision
            );
            return Err(RepoError::Conflict {
                expected: document.revision,
                actual,
            });
        }

        info!(
            "event=document_save module=repo status=ok store=sqlite revision={next} cases={}",
            stored.cases.len()
        );
        Ok(next)
    }
}

fn ensure_document_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'documents'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable("documents"));
    }

    let rows: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE id = ?1;",
        [DOCUMENT_ROW_ID],
        |row| row.get(0),
    )?;
    if rows != 1 {
        return Err(RepoError::MissingDocumentRow);
    }

    Ok(())
}

fn revision_to_db(revision: u64) -> RepoResult<i64> {
    i64::try_from(revision)
        .map_err(|_| RepoError::InvalidData(format!("revision {revision} exceeds storage range")))
}

fn revision_from_db(revision: i64) -> RepoResult<u64> {
    u64::try_from(revision).map_err(|_| {
        RepoError::InvalidData(format!("invalid revision `{revision}` in documents.revision"))
    })
}
