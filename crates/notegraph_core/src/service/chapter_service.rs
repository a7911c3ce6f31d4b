//! Chapter use-case service.
//!
//! # Responsibility
//! - Validate chapter requests (`name` and `number` together) before any
//!   store access.
//! - Expose insert/update/fetch/list/get/delete over [`ChapterRepository`].
//!
//! # Invariants
//! - `list_chapters` is sorted by chapter number.
//! - A request with field errors never reaches the store.

use crate::model::chapter::Chapter;
use crate::model::value::{ChapterId, ChapterNumber, Id, Name, ValueError};
use crate::repo::chapter_repo::ChapterRepository;
use crate::repo::document_store::DocumentStore;
use crate::repo::RepoError;
use crate::service::{collect, ErrorKind};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field errors of a chapter request. Empty strings mean no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChapterFieldErrors {
    pub name: String,
    pub number: String,
}

impl ChapterFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.number.is_empty()
    }
}

/// Service error for chapter use-cases.
#[derive(Debug)]
pub enum ChapterServiceError {
    /// One or more request fields are invalid.
    InvalidFields(ChapterFieldErrors),
    /// Malformed identifier or cross-field rule violation.
    InvalidArgument(String),
    /// Project or chapter is absent or hidden from the caller.
    NotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ChapterServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFields(_) => ErrorKind::Validation,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ChapterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFields(_) => f.write_str("chapter request has invalid fields"),
            Self::InvalidArgument(message) | Self::NotFound(message) => f.write_str(message),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ChapterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ChapterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(message) => Self::NotFound(message),
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValueError> for ChapterServiceError {
    fn from(value: ValueError) -> Self {
        Self::InvalidArgument(value.into_message())
    }
}

pub type ChapterServiceResult<T> = Result<T, ChapterServiceError>;

/// Chapter service facade over an injected document store.
pub struct ChapterService<S> {
    repo: ChapterRepository<S>,
}

impl<S: DocumentStore> ChapterService<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: ChapterRepository::new(store),
        }
    }

    /// Inserts a chapter at 1-based `number`, shifting later chapters.
    pub fn create_chapter(
        &self,
        project_id: &str,
        user_id: &str,
        name: &str,
        number: i64,
    ) -> ChapterServiceResult<Chapter> {
        let project_id = Id::parse("project id", project_id)?;
        let user_id = Id::parse("user id", user_id)?;
        let (name, number) = validate_fields(name, number)?;
        Ok(self
            .repo
            .insert_chapter(&project_id, &user_id, &name, number)?)
    }

    /// Renames a chapter and moves it to `number`.
    pub fn update_chapter(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
        name: &str,
        number: i64,
    ) -> ChapterServiceResult<Chapter> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;
        let (name, number) = validate_fields(name, number)?;
        Ok(self
            .repo
            .update_chapter(&project_id, &chapter_id, &user_id, &name, number)?)
    }

    /// Every chapter of a project keyed by id.
    pub fn fetch_project_chapters(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> ChapterServiceResult<HashMap<ChapterId, Chapter>> {
        let project_id = Id::parse("project id", project_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self.repo.fetch_project_chapters(&project_id, &user_id)?)
    }

    /// Every chapter of a project in number order.
    pub fn list_chapters(&self, project_id: &str, user_id: &str) -> ChapterServiceResult<Vec<Chapter>> {
        let mut chapters = self
            .fetch_project_chapters(project_id, user_id)?
            .into_values()
            .collect::<Vec<_>>();
        chapters.sort_by_key(|chapter| chapter.number);
        Ok(chapters)
    }

    pub fn get_chapter(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
    ) -> ChapterServiceResult<Chapter> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self.repo.get_chapter(&project_id, &chapter_id, &user_id)?)
    }

    /// Deletes a chapter together with its graphs and paper.
    pub fn delete_chapter(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
    ) -> ChapterServiceResult<()> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self.repo.delete_chapter(&project_id, &chapter_id, &user_id)?)
    }
}

fn validate_fields(name: &str, number: i64) -> ChapterServiceResult<(Name, ChapterNumber)> {
    let mut errors = ChapterFieldErrors::default();
    let name = collect(Name::parse("name", name), &mut errors.name);
    let number = collect(ChapterNumber::parse("number", number), &mut errors.number);
    match (name, number) {
        (Some(name), Some(number)) => Ok((name, number)),
        _ => Err(ChapterServiceError::InvalidFields(errors)),
    }
}
