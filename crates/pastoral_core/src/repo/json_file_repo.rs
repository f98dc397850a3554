//! JSON file document repository.
//!
//! # Responsibility
//! - Read and write the whole document as one pretty-printed JSON file.
//!
//! # Invariants
//! - Writes go to a temp file in the target directory and are renamed over
//!   the target, so readers see the old or the new document, never a mix.
//! - Writers hold an exclusive lock on `<path>.lock` from the revision check
//!   until after the rename, across threads and processes alike.

use crate::model::document::Document;
use crate::repo::document_repo::{next_revision, DocumentRepository, RepoError, RepoResult};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Only the revision field, for checks before a write.
#[derive(Deserialize)]
struct StoredRevision {
    #[serde(default)]
    revision: u64,
}

/// Document repository backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileDocumentRepository {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileDocumentRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = OsString::from(path.as_os_str());
        lock_name.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty document at revision 0 when the file does not exist yet.
    ///
    /// Returns `true` when a file was created.
    pub fn create_if_missing(&self) -> RepoResult<bool> {
        let _lock = self.lock_for_write()?;
        if self.path.exists() {
            return Ok(false);
        }
        self.write_document(&Document::default())?;
        Ok(true)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> RepoError {
        RepoError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Blocks until this handle owns the writer lock. Released when the
    /// returned handle is dropped.
    fn lock_for_write(&self) -> RepoResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|err| self.io_error(&self.lock_path, err))?;
        FileExt::lock_exclusive(&file).map_err(|err| self.io_error(&self.lock_path, err))?;
        debug!(
            "event=document_lock module=repo status=acquired lock_path={}",
            self.lock_path.display()
        );
        Ok(file)
    }

    fn stored_revision(&self) -> RepoResult<u64> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str::<StoredRevision>(&raw)
                .map(|stored| stored.revision)
                .map_err(|err| RepoError::InvalidData(format!("{}: {err}", self.path.display()))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(0),
            Err(err) => Err(self.io_error(&self.path, err)),
        }
    }

    fn target_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Replaces the file with `document`. Caller holds the writer lock.
    fn write_document(&self, document: &Document) -> RepoResult<()> {
        let body = serde_json::to_string_pretty(document).map_err(RepoError::Encode)?;
        let mut file = NamedTempFile::new_in(self.target_dir())
            .map_err(|err| self.io_error(self.target_dir(), err))?;
        file.write_all(body.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|err| self.io_error(file.path(), err))?;
        file.persist(&self.path)
            .map_err(|err| self.io_error(&self.path, err.error))?;
        Ok(())
    }
}

impl DocumentRepository for JsonFileDocumentRepository {
    fn load(&self) -> RepoResult<Document> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|err| self.io_error(&self.path, err))?;
        serde_json::from_str(&raw)
            .map_err(|err| RepoError::InvalidData(format!("{}: {err}", self.path.display())))
    }

    fn save(&self, document: &Document) -> RepoResult<u64> {
        let next = next_revision(document.revision)?;
        let _lock = self.lock_for_write()?;

        let actual = self.stored_revision()?;
        if actual != document.revision {
            warn!(
                "event=document_save module=repo status=conflict store=json expected_revision={} actual_revision={actual}",
                document.revision
            );
            return Err(RepoError::Conflict {
                expected: document.revision,
                actual,
            });
        }

        let mut stored = document.clone();
        stored.revision = next;
        self.write_document(&stored)?;

        info!(
            "event=document_save module=repo status=ok store=json revision={next} cases={}",
            stored.cases.len()
        );
        Ok(next)
    }
}
