//! Project repository.
//!
//! # Invariants
//! - A missing `chapterIds` field reads as an empty order array.
//! - Ownership is checked on every access; foreign projects read as absent.

use crate::model::project::Project;
use crate::model::value::{Description, Id, Name, ProjectId, UserId};
use crate::repo::document_store::{Document, DocumentStore, WriteOp};
use crate::repo::{get_document, persisted, RepoError, RepoResult, PROJECTS};
use log::info;
use serde::{Deserialize, Serialize};

/// Persisted shape of a project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub author_id: String,
    #[serde(default)]
    pub chapter_ids: Option<Vec<String>>,
}

impl ProjectRecord {
    /// Order array, with a missing array treated as empty.
    pub fn chapter_ids(&self) -> &[String] {
        self.chapter_ids.as_deref().unwrap_or_default()
    }

    /// Copy of this record carrying a rebuilt order array.
    pub fn with_chapter_ids(&self, chapter_ids: Vec<String>) -> Self {
        Self {
            chapter_ids: Some(chapter_ids),
            ..self.clone()
        }
    }
}

/// Project document as loaded for an authorized caller.
pub(crate) struct OwnedProject {
    pub document: Document,
    pub record: ProjectRecord,
}

/// Loads a project and verifies that `user_id` authored it.
///
/// Absence and ownership mismatch produce the same `NotFound`.
pub(crate) fn load_owned_project<S: DocumentStore>(
    store: &S,
    project_id: &ProjectId,
    user_id: &UserId,
) -> RepoResult<OwnedProject> {
    let document = get_document(store, PROJECTS, project_id, "project")?;
    let record: ProjectRecord = document.decode().map_err(RepoError::Read)?;
    if record.author_id != user_id.as_str() {
        return Err(RepoError::NotFound(format!("project not found: {project_id}")));
    }
    Ok(OwnedProject { document, record })
}

/// Project persistence over an injected document store.
pub struct ProjectRepository<S> {
    store: S,
}

impl<S: DocumentStore> ProjectRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an empty project authored by `author_id`.
    pub fn create_project(
        &self,
        author_id: &UserId,
        name: &Name,
        description: &Description,
    ) -> RepoResult<Project> {
        let project_id = self.store.new_id();
        let record = ProjectRecord {
            name: name.as_str().to_string(),
            description: description.as_str().to_string(),
            author_id: author_id.as_str().to_string(),
            chapter_ids: Some(Vec::new()),
        };
        let write = WriteOp::create(PROJECTS, project_id.as_str(), &record).map_err(RepoError::Write)?;
        self.store.commit(vec![write]).map_err(RepoError::Write)?;
        info!("event=project_create module=repo status=ok project_id={project_id}");

        let document = self.store.get(PROJECTS, &project_id).map_err(RepoError::Read)?;
        parse_project(&document)
    }

    /// Loads one project owned by `user_id`.
    pub fn get_project(&self, project_id: &ProjectId, user_id: &UserId) -> RepoResult<Project> {
        let owned = load_owned_project(&self.store, project_id, user_id)?;
        parse_project(&owned.document)
    }

    /// Lists projects authored by `user_id`, oldest first. Ties on
    /// `created_at` are ordered by id.
    ///
    /// Other authors' documents are only decoded far enough to read the
    /// author, so their contents cannot fail this listing.
    pub fn list_projects(&self, user_id: &UserId) -> RepoResult<Vec<Project>> {
        let documents = self.store.list(PROJECTS).map_err(RepoError::Read)?;
        let mut projects = Vec::new();
        for document in &documents {
            if author_of(document) == Some(user_id.as_str()) {
                projects.push(parse_project(document)?);
            }
        }
        projects.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(projects)
    }

    /// Replaces name and description, keeping the chapter order untouched.
    pub fn update_project(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        name: &Name,
        description: &Description,
    ) -> RepoResult<Project> {
        let owned = load_owned_project(&self.store, project_id, user_id)?;
        let record = ProjectRecord {
            name: name.as_str().to_string(),
            description: description.as_str().to_string(),
            ..owned.record
        };
        let write =
            WriteOp::update(PROJECTS, project_id.as_str(), &record).map_err(RepoError::Write)?;
        self.store.commit(vec![write]).map_err(RepoError::Write)?;
        info!("event=project_update module=repo status=ok project_id={project_id}");

        let document = get_document(&self.store, PROJECTS, project_id, "project")?;
        parse_project(&document)
    }
}

/// Raw `authorId` of a project body, without decoding the rest.
fn author_of(document: &Document) -> Option<&str> {
    document.body.get("authorId").and_then(|author| author.as_str())
}

pub(crate) fn parse_project(document: &Document) -> RepoResult<Project> {
    let record: ProjectRecord = document.decode().map_err(RepoError::Read)?;
    let doc_id = document.id.as_str();
    let chapter_ids = record
        .chapter_ids()
        .iter()
        .map(|id| persisted(Id::parse("chapter id", id.as_str()), PROJECTS, doc_id))
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(Project {
        id: persisted(Id::parse("project id", doc_id), PROJECTS, doc_id)?,
        name: persisted(Name::parse("name", record.name), PROJECTS, doc_id)?,
        description: persisted(
            Description::parse("description", record.description),
            PROJECTS,
            doc_id,
        )?,
        author_id: persisted(Id::parse("user id", record.author_id), PROJECTS, doc_id)?,
        chapter_ids,
        created_at: document.created_at,
        updated_at: document.updated_at,
    })
}
