//! Schema steps for the document store.
//!
//! # Invariants
//! - Step versions are contiguous from 1; `PRAGMA user_version` records the
//!   last applied step.
//! - Pending steps and the document row seed commit together or not at all.
//! - A database written by a newer build is refused, never downgraded.

use crate::db::DOCUMENT_ROW_ID;
use crate::model::document::Document;
use crate::repo::document_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, Transaction};

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "documents",
    sql: include_str!("0001_documents.sql"),
}];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded on `conn`.
pub fn schema_version(conn: &Connection) -> RepoResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Applies pending schema steps and seeds the empty document row when absent.
///
/// Returns the names of the steps applied by this call.
pub fn apply_migrations(conn: &mut Connection) -> RepoResult<Vec<&'static str>> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(RepoError::UnsupportedSchemaVersion {
            found: from_version,
            supported: latest,
        });
    }

    let tx = conn.transaction()?;
    let applied = SCHEMA_STEPS
        .iter()
        .skip_while(|step| step.version <= from_version)
        .map(|step| -> RepoResult<&'static str> {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            Ok(step.name)
        })
        .collect::<RepoResult<Vec<_>>>()?;
    let seeded = seed_document_row(&tx)?;
    tx.commit()?;

    if !applied.is_empty() || seeded {
        info!(
            "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} steps={} seeded_row={seeded}",
            applied.join(",")
        );
    }
    Ok(applied)
}

fn seed_document_row(tx: &Transaction<'_>) -> RepoResult<bool> {
    let body = serde_json::to_string(&Document::default()).map_err(RepoError::Encode)?;
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO documents (id, revision, body) VALUES (?1, 0, ?2);",
        params![DOCUMENT_ROW_ID, body],
    )?;
    Ok(inserted == 1)
}
