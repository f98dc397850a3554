//! Whole-document repositories.
//!
//! # Responsibility
//! - Define the load/save contract the services are written against.
//! - Keep storage details (SQLite rows, JSON files) out of the services.
//!
//! # Invariants
//! - `save` replaces the entire document or nothing at all.
//! - `save` only succeeds when the stored revision equals `Document::revision`.
//!
//! # See also
//! - `service::case_service` for the load -> transition -> save cycle.

pub mod document_repo;
pub mod json_file_repo;
