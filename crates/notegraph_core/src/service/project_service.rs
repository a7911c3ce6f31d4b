//! Project use-case service.

use crate::model::project::Project;
use crate::model::value::{Description, Id, Name, ValueError};
use crate::repo::document_store::DocumentStore;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use crate::service::{collect, ErrorKind};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field errors of a project request. Empty strings mean no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectFieldErrors {
    pub name: String,
    pub description: String,
}

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// One or more request fields are invalid.
    InvalidFields(ProjectFieldErrors),
    /// Malformed identifier.
    InvalidArgument(String),
    /// Project is absent or owned by someone else.
    NotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ProjectServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFields(_) => ErrorKind::Validation,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFields(_) => f.write_str("project request has invalid fields"),
            Self::InvalidArgument(message) | Self::NotFound(message) => f.write_str(message),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(message) => Self::NotFound(message),
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValueError> for ProjectServiceError {
    fn from(value: ValueError) -> Self {
        Self::InvalidArgument(value.into_message())
    }
}

pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project service facade over an injected document store.
pub struct ProjectService<S> {
    repo: ProjectRepository<S>,
}

impl<S: DocumentStore> ProjectService<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: ProjectRepository::new(store),
        }
    }

    /// Creates an empty project authored by `user_id`.
    pub fn create_project(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> ProjectServiceResult<Project> {
        let user_id = Id::parse("user id", user_id)?;
        let (name, description) = validate_fields(name, description)?;
        Ok(self.repo.create_project(&user_id, &name, &description)?)
    }

    pub fn get_project(&self, project_id: &str, user_id: &str) -> ProjectServiceResult<Project> {
        let project_id = Id::parse("project id", project_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self.repo.get_project(&project_id, &user_id)?)
    }

    /// Projects authored by `user_id`, oldest first.
    pub fn list_projects(&self, user_id: &str) -> ProjectServiceResult<Vec<Project>> {
        let user_id = Id::parse("user id", user_id)?;
        Ok(self.repo.list_projects(&user_id)?)
    }

    pub fn update_project(
        &self,
        project_id: &str,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> ProjectServiceResult<Project> {
        let project_id = Id::parse("project id", project_id)?;
        let user_id = Id::parse("user id", user_id)?;
        let (name, description) = validate_fields(name, description)?;
        Ok(self
            .repo
            .update_project(&project_id, &user_id, &name, &description)?)
    }
}

fn validate_fields(name: &str, description: &str) -> ProjectServiceResult<(Name, Description)> {
    let mut errors = ProjectFieldErrors::default();
    let name = collect(Name::parse("name", name), &mut errors.name);
    let description = collect(
        Description::parse("description", description),
        &mut errors.description,
    );
    match (name, description) {
        (Some(name), Some(description)) => Ok((name, description)),
        _ => Err(ProjectServiceError::InvalidFields(errors)),
    }
}
