//! Paper repository: the flat-text rendering of a chapter.

use crate::model::chapter::Chapter;
use crate::model::paper::Paper;
use crate::model::value::{ChapterId, Content, Id, ProjectId, UserId};
use crate::repo::chapter_repo::{load_positioned_chapter, parse_chapter};
use crate::repo::document_store::{Document, DocumentStore, StoreError, WriteOp};
use crate::repo::project_repo::load_owned_project;
use crate::repo::{chapters_path, papers_path, persisted, RepoError, RepoResult};
use log::info;
use serde::{Deserialize, Serialize};

/// Persisted shape of a paper document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PaperRecord {
    #[serde(default)]
    pub content: String,
}

/// Paper persistence over an injected document store.
pub struct PaperRepository<S> {
    store: S,
}

impl<S: DocumentStore> PaperRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the paper of a chapter. `None` until one has been written.
    pub fn get_paper(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
    ) -> RepoResult<Option<Paper>> {
        self.get_chapter_paper(project_id, chapter_id, user_id)
            .map(|(_, paper)| paper)
    }

    /// Loads a chapter together with its paper, checking ownership once.
    pub fn get_chapter_paper(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
    ) -> RepoResult<(Chapter, Option<Paper>)> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let positioned = load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let chapter = parse_chapter(
            &chapters_path(project_id),
            &positioned.document,
            positioned.number,
        )?;

        let papers = papers_path(project_id, chapter_id);
        let paper = match self.store.get(&papers, chapter_id.as_str()) {
            Ok(document) => Some(parse_paper(&papers, &document)?),
            Err(StoreError::NotFound { .. }) => None,
            Err(err) => return Err(RepoError::Read(err)),
        };
        Ok((chapter, paper))
    }

    /// Creates or replaces the paper of a chapter.
    pub fn put_paper(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
        content: &Content,
    ) -> RepoResult<Paper> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let papers = papers_path(project_id, chapter_id);
        let exists = match self.store.get(&papers, chapter_id.as_str()) {
            Ok(_) => true,
            Err(StoreError::NotFound { .. }) => false,
            Err(err) => return Err(RepoError::Read(err)),
        };

        let record = PaperRecord {
            content: content.as_str().to_string(),
        };
        let write = if exists {
            WriteOp::update(papers.as_str(), chapter_id.as_str(), &record)
        } else {
            WriteOp::create(papers.as_str(), chapter_id.as_str(), &record)
        }
        .map_err(RepoError::Write)?;
        self.store.commit(vec![write]).map_err(RepoError::Write)?;
        info!(
            "event=paper_put module=repo status=ok project_id={project_id} chapter_id={chapter_id} created={} bytes={}",
            !exists,
            content.as_str().len()
        );

        let document = self
            .store
            .get(&papers, chapter_id.as_str())
            .map_err(RepoError::Read)?;
        parse_paper(&papers, &document)
    }
}

fn parse_paper(collection: &str, document: &Document) -> RepoResult<Paper> {
    let record: PaperRecord = document.decode().map_err(RepoError::Read)?;
    let doc_id = document.id.as_str();
    Ok(Paper {
        id: persisted(Id::parse("paper id", doc_id), collection, doc_id)?,
        content: persisted(Content::parse("content", record.content), collection, doc_id)?,
        created_at: document.created_at,
        updated_at: document.updated_at,
    })
}
