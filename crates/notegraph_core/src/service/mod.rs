//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Accept primitive request values, validate them and report every field
//!   error of a request in one pass.
//! - Orchestrate repository calls and tag failures with a stable
//!   [`ErrorKind`] so an outer layer can map them without reading messages.

pub mod chapter_service;
pub mod graph_service;
pub mod paper_service;
pub mod project_service;

use crate::repo::RepoError;
use crate::validation::message_of;
use crate::model::value::ValueResult;

/// Stable classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Field-level errors, reported as a mirrored error structure.
    Validation,
    /// Well-formed request violating a cross-field rule.
    InvalidArgument,
    /// Target is absent or hidden from the caller.
    NotFound,
    /// Reading from the store failed or found inconsistent documents.
    ReadFailure,
    /// Writing to the store failed; no write of the batch applied.
    WriteFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::ReadFailure => "read_failure",
            Self::WriteFailure => "write_failure",
        }
    }
}

impl RepoError {
    /// Kind reported for a repository failure surfacing from a service.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Integrity(_) | Self::InvalidData(_) | Self::Read(_) => ErrorKind::ReadFailure,
            Self::Write(_) => ErrorKind::WriteFailure,
        }
    }
}

/// Records the message of a failed field and returns the value when valid.
pub(crate) fn collect<T>(result: ValueResult<T>, slot: &mut String) -> Option<T> {
    *slot = message_of(&result);
    result.ok()
}
