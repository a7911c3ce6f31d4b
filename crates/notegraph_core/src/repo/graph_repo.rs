//! Graph repository: section graphs of a chapter.
//!
//! # Invariants
//! - A graph document is keyed by the id of the section summary pointing at
//!   it on the owning chapter.
//! - Sectionalizing replaces the chapter's section summaries and creates
//!   their graphs in one batch; graphs behind replaced summaries are deleted
//!   in the same batch.
//! - Deleting a graph leaves the chapter's section summaries untouched.

use crate::model::chapter::Chapter;
use crate::model::graph::{Graph, GraphChild, SectionDraft};
use crate::model::value::{ChapterId, Content, GraphId, Id, Name, ProjectId, UserId};
use crate::repo::chapter_repo::{load_positioned_chapter, parse_chapter, ChapterRecord, SectionRecord};
use crate::repo::document_store::{Document, DocumentStore, WriteOp};
use crate::repo::project_repo::load_owned_project;
use crate::repo::{chapters_path, get_document, graphs_path, persisted, RepoError, RepoResult};
use crate::validation::graph_tree::{validate_graph_children, RawGraphChild};
use log::info;
use serde::{Deserialize, Serialize};

/// Persisted shape of a graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GraphRecord {
    pub name: String,
    #[serde(default)]
    pub paragraph: String,
    #[serde(default)]
    pub children: Vec<RawGraphChild>,
}

/// Graph persistence over an injected document store.
pub struct GraphRepository<S> {
    store: S,
}

impl<S: DocumentStore> GraphRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates one graph per draft and points the chapter's section
    /// summaries at them, in draft order.
    pub fn sectionalize(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
        drafts: &[SectionDraft],
    ) -> RepoResult<Chapter> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let chapter = load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let graphs = graphs_path(project_id, chapter_id);

        let mut writes = chapter
            .record
            .sections
            .iter()
            .map(|stale| WriteOp::delete(graphs.as_str(), stale.id.as_str()))
            .collect::<Vec<_>>();
        let replaced = writes.len();

        let mut sections = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let graph_id = self.store.new_id();
            let record = GraphRecord {
                name: draft.name.as_str().to_string(),
                paragraph: draft.content.as_str().to_string(),
                children: Vec::new(),
            };
            writes.push(
                WriteOp::create(graphs.as_str(), graph_id.as_str(), &record)
                    .map_err(RepoError::Write)?,
            );
            sections.push(SectionRecord {
                id: graph_id,
                name: draft.name.as_str().to_string(),
            });
        }

        let chapters = chapters_path(project_id);
        let record = ChapterRecord {
            sections,
            ..chapter.record
        };
        writes.push(
            WriteOp::update(chapters.as_str(), chapter_id.as_str(), &record)
                .map_err(RepoError::Write)?,
        );
        self.store.commit(writes).map_err(RepoError::Write)?;
        info!(
            "event=chapter_sectionalize module=repo status=ok project_id={project_id} chapter_id={chapter_id} sections={} replaced={replaced}",
            drafts.len()
        );

        let document = get_document(&self.store, &chapters, chapter_id, "chapter")?;
        parse_chapter(&chapters, &document, chapter.number)
    }

    /// Loads one graph of a chapter.
    pub fn get_graph(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        graph_id: &GraphId,
        user_id: &UserId,
    ) -> RepoResult<Graph> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let graphs = graphs_path(project_id, chapter_id);
        let document = get_document(&self.store, &graphs, graph_id, "graph")?;
        parse_graph(&graphs, &document)
    }

    /// Replaces name, paragraph and children of a graph, renaming the
    /// matching section summary in the same batch.
    #[allow(clippy::too_many_arguments)]
    pub fn update_graph(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        graph_id: &GraphId,
        user_id: &UserId,
        name: &Name,
        paragraph: &Content,
        children: &[GraphChild],
    ) -> RepoResult<Graph> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let mut chapter = load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let graphs = graphs_path(project_id, chapter_id);
        get_document(&self.store, &graphs, graph_id, "graph")?;

        let record = GraphRecord {
            name: name.as_str().to_string(),
            paragraph: paragraph.as_str().to_string(),
            children: children.iter().map(RawGraphChild::from).collect(),
        };
        let mut writes = vec![WriteOp::update(graphs.as_str(), graph_id.as_str(), &record)
            .map_err(RepoError::Write)?];

        let renamed = match chapter
            .record
            .sections
            .iter_mut()
            .find(|section| section.id == graph_id.as_str())
        {
            Some(section) if section.name != name.as_str() => {
                section.name = name.as_str().to_string();
                true
            }
            _ => false,
        };
        if renamed {
            writes.push(
                WriteOp::update(chapters_path(project_id), chapter_id.as_str(), &chapter.record)
                    .map_err(RepoError::Write)?,
            );
        }

        self.store.commit(writes).map_err(RepoError::Write)?;
        info!(
            "event=graph_update module=repo status=ok project_id={project_id} chapter_id={chapter_id} graph_id={graph_id} renamed={renamed}"
        );

        let document = get_document(&self.store, &graphs, graph_id, "graph")?;
        parse_graph(&graphs, &document)
    }

    /// Deletes one graph document.
    pub fn delete_graph(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        graph_id: &GraphId,
        user_id: &UserId,
    ) -> RepoResult<()> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let graphs = graphs_path(project_id, chapter_id);
        get_document(&self.store, &graphs, graph_id, "graph")?;

        self.store
            .commit(vec![WriteOp::delete(graphs.as_str(), graph_id.as_str())])
            .map_err(RepoError::Write)?;
        info!(
            "event=graph_delete module=repo status=ok project_id={project_id} chapter_id={chapter_id} graph_id={graph_id}"
        );
        Ok(())
    }
}

fn parse_graph(collection: &str, document: &Document) -> RepoResult<Graph> {
    let record: GraphRecord = document.decode().map_err(RepoError::Read)?;
    let doc_id = document.id.as_str();
    let children = validate_graph_children(&record.children).map_err(|_| {
        RepoError::InvalidData(format!("{collection}/{doc_id}: invalid graph children"))
    })?;

    Ok(Graph {
        id: persisted(Id::parse("graph id", doc_id), collection, doc_id)?,
        name: persisted(Name::parse("name", record.name), collection, doc_id)?,
        paragraph: persisted(
            Content::parse("paragraph", record.paragraph),
            collection,
            doc_id,
        )?,
        children,
        created_at: document.created_at,
        updated_at: document.updated_at,
    })
}
