//! Graph use-case service: sectionalizing chapters and editing section
//! graphs.
//!
//! # Invariants
//! - Section lists and child trees are validated as a whole; callers get the
//!   complete mirrored error structure, never only the first failure.
//! - A request with field errors never reaches the store.

use crate::model::chapter::Chapter;
use crate::model::graph::Graph;
use crate::model::value::{Content, Id, Name, ValueError};
use crate::repo::document_store::DocumentStore;
use crate::repo::graph_repo::GraphRepository;
use crate::repo::RepoError;
use crate::service::{collect, ErrorKind};
use crate::validation::graph_tree::{validate_graph_children, GraphChildrenErrors, RawGraphChild};
use crate::validation::section_list::{validate_section_list, RawSection, SectionListErrors};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field errors of a graph update. Empty strings mean no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphFieldErrors {
    pub name: String,
    pub paragraph: String,
    pub children: GraphChildrenErrors,
}

impl GraphFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.paragraph.is_empty() && self.children.is_empty()
    }
}

/// Service error for graph use-cases.
#[derive(Debug)]
pub enum GraphServiceError {
    /// Section list failed validation.
    InvalidSections(SectionListErrors),
    /// Graph update fields failed validation.
    InvalidFields(GraphFieldErrors),
    /// Malformed identifier.
    InvalidArgument(String),
    /// Project, chapter or graph is absent or hidden from the caller.
    NotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl GraphServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSections(_) | Self::InvalidFields(_) => ErrorKind::Validation,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for GraphServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSections(errors) if !errors.message.is_empty() => {
                f.write_str(&errors.message)
            }
            Self::InvalidSections(_) => f.write_str("sections have invalid fields"),
            Self::InvalidFields(_) => f.write_str("graph request has invalid fields"),
            Self::InvalidArgument(message) | Self::NotFound(message) => f.write_str(message),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GraphServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(message) => Self::NotFound(message),
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValueError> for GraphServiceError {
    fn from(value: ValueError) -> Self {
        Self::InvalidArgument(value.into_message())
    }
}

pub type GraphServiceResult<T> = Result<T, GraphServiceError>;

/// Graph service facade over an injected document store.
pub struct GraphService<S> {
    repo: GraphRepository<S>,
}

impl<S: DocumentStore> GraphService<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: GraphRepository::new(store),
        }
    }

    /// Replaces the sections of a chapter with one fresh graph per entry.
    pub fn sectionalize(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
        sections: &[RawSection],
    ) -> GraphServiceResult<Chapter> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;
        let drafts = validate_section_list(sections).map_err(GraphServiceError::InvalidSections)?;
        Ok(self
            .repo
            .sectionalize(&project_id, &chapter_id, &user_id, &drafts)?)
    }

    pub fn get_graph(
        &self,
        project_id: &str,
        chapter_id: &str,
        graph_id: &str,
        user_id: &str,
    ) -> GraphServiceResult<Graph> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let graph_id = Id::parse("graph id", graph_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self
            .repo
            .get_graph(&project_id, &chapter_id, &graph_id, &user_id)?)
    }

    /// Replaces name, paragraph and child tree of one graph.
    #[allow(clippy::too_many_arguments)]
    pub fn update_graph(
        &self,
        project_id: &str,
        chapter_id: &str,
        graph_id: &str,
        user_id: &str,
        name: &str,
        paragraph: &str,
        children: &[RawGraphChild],
    ) -> GraphServiceResult<Graph> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let graph_id = Id::parse("graph id", graph_id)?;
        let user_id = Id::parse("user id", user_id)?;

        let mut errors = GraphFieldErrors::default();
        let name = collect(Name::parse("name", name), &mut errors.name);
        let paragraph = collect(Content::parse("paragraph", paragraph), &mut errors.paragraph);
        let children = match validate_graph_children(children) {
            Ok(children) => Some(children),
            Err(children_errors) => {
                errors.children = children_errors;
                None
            }
        };
        let (Some(name), Some(paragraph), Some(children)) = (name, paragraph, children) else {
            return Err(GraphServiceError::InvalidFields(errors));
        };

        Ok(self.repo.update_graph(
            &project_id,
            &chapter_id,
            &graph_id,
            &user_id,
            &name,
            &paragraph,
            &children,
        )?)
    }

    /// Deletes one graph; the chapter's section summaries are left as is.
    pub fn delete_graph(
        &self,
        project_id: &str,
        chapter_id: &str,
        graph_id: &str,
        user_id: &str,
    ) -> GraphServiceResult<()> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let graph_id = Id::parse("graph id", graph_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self
            .repo
            .delete_graph(&project_id, &chapter_id, &graph_id, &user_id)?)
    }
}
