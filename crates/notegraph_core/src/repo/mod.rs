//! Repository layer over the document store.
//!
//! # Responsibility
//! - Map domain operations onto whole-document reads and atomic write batches.
//! - Keep collection layout and record encoding inside the repository boundary.
//!
//! # Invariants
//! - Records read back from the store are re-validated into read models;
//!   invalid persisted state is rejected instead of masked.
//! - A project that is absent and a project owned by someone else produce
//!   the same `NotFound` error.
//! - Store failures are tagged as read or write failures at the call site.

pub mod chapter_repo;
pub mod document_store;
pub mod graph_repo;
pub mod paper_repo;
pub mod project_repo;

use crate::model::value::{ChapterId, Id, ProjectId, ValueError};
use document_store::{Document, DocumentStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Collection holding every project document.
pub const PROJECTS: &str = "projects";

/// Collection holding the chapters of one project.
pub fn chapters_path(project_id: &ProjectId) -> String {
    format!("{PROJECTS}/{project_id}/chapters")
}

/// Collection holding the section graphs of one chapter.
pub fn graphs_path(project_id: &ProjectId, chapter_id: &ChapterId) -> String {
    format!("{}/{chapter_id}/graphs", chapters_path(project_id))
}

/// Collection holding the paper of one chapter.
pub fn papers_path(project_id: &ProjectId, chapter_id: &ChapterId) -> String {
    format!("{}/{chapter_id}/papers", chapters_path(project_id))
}

/// Errors from repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Target document is absent or hidden from the caller.
    NotFound(String),
    /// Request values violate a cross-field business rule.
    InvalidArgument(String),
    /// Documents that must agree with each other have diverged.
    Integrity(&'static str),
    /// Persisted document cannot be converted to a valid read model.
    InvalidData(String),
    /// Store rejected a read.
    Read(StoreError),
    /// Store rejected a write batch.
    Write(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(message) => f.write_str(message),
            Self::InvalidArgument(message) => f.write_str(message),
            Self::Integrity(message) => f.write_str(message),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Read(err) => write!(f, "failed to read documents: {err}"),
            Self::Write(err) => write!(f, "failed to write documents: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(err) | Self::Write(err) => Some(err),
            _ => None,
        }
    }
}

/// Loads one document, turning a missing key into a domain `NotFound`.
pub(crate) fn get_document<S: DocumentStore>(
    store: &S,
    collection: &str,
    id: &Id,
    label: &'static str,
) -> RepoResult<Document> {
    match store.get(collection, id.as_str()) {
        Ok(document) => Ok(document),
        Err(StoreError::NotFound { .. }) => Err(RepoError::NotFound(format!("{label} not found: {id}"))),
        Err(err) => Err(RepoError::Read(err)),
    }
}

/// Re-validates a persisted field; failures become `InvalidData`.
pub(crate) fn persisted<T>(
    result: Result<T, ValueError>,
    collection: &str,
    id: &str,
) -> RepoResult<T> {
    result.map_err(|err| RepoError::InvalidData(format!("{collection}/{id}: {err}")))
}
