//! SQLite bootstrap for the document store.
//!
//! # Responsibility
//! - Open connections for `SqliteDocumentRepository`.
//! - Bring the schema up to date and guarantee the single document row.
//!
//! # Invariants
//! - A connection returned by `open_db*` holds exactly one `documents` row
//!   (`id = DOCUMENT_ROW_ID`), so repositories only update it in place.
//! - Bootstrap failures are reported as `RepoError`, like every other store
//!   failure.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Row id of the one stored document.
pub const DOCUMENT_ROW_ID: i64 = 1;
