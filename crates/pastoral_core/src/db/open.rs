//! Connection bootstrap for the SQLite document store.
//!
//! # Invariants
//! - Returned connections are migrated and hold the document row.
//! - Every open emits one `db_open` start event and one ok/error event.

use super::migrations::apply_migrations;
use crate::repo::document_repo::{RepoError, RepoResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Concurrent writers wait this long for `SQLITE_BUSY` to clear.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a document store file.
pub fn open_db(path: impl AsRef<Path>) -> RepoResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory document store.
pub fn open_db_in_memory() -> RepoResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> RepoResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let bootstrapped = connect().map_err(RepoError::from).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let applied = apply_migrations(&mut conn)?;
        Ok((conn, applied.len()))
    });

    match bootstrapped {
        Ok((conn, steps)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} steps_applied={steps} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}
