//! Chapter repository and ordered chapter positioning.
//!
//! Chapters are independent documents under `projects/{id}/chapters`, while
//! their order lives in the parent project's `chapterIds` array. This module
//! keeps both representations consistent across insert, update (rename and
//! move) and delete.
//!
//! # Invariants
//! - The order array is authoritative for ordering; the chapter collection
//!   is authoritative for existence. Any divergence between them is a hard
//!   read failure and is never repaired on the fly.
//! - A chapter number is `1 + index` of its id in the order array, computed
//!   at read time.
//! - Insert accepts numbers in `1..=len + 1`, update accepts `1..=len`.
//! - The chapter write and the order-array write of one operation are
//!   committed in the same batch.
//! - An update that keeps the current position issues no project write.

use crate::model::chapter::{Chapter, SectionSummary};
use crate::model::value::{ChapterId, ChapterNumber, Id, Name, ProjectId, UserId};
use crate::repo::document_store::{Document, DocumentStore, WriteOp};
use crate::repo::project_repo::{load_owned_project, ProjectRecord};
use crate::repo::{
    chapters_path, get_document, graphs_path, papers_path, persisted, RepoError, RepoResult,
    PROJECTS,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A chapter document exists that the order array does not list.
pub const DEFICIENT_CHAPTER_IDS: &str = "chapterIds have deficient elements";
/// The order array lists an id with no chapter document behind it.
pub const EXCESSIVE_CHAPTER_IDS: &str = "chapterIds have excessive elements";
/// Requested number is past the end of the order array.
pub const CHAPTER_NUMBER_TOO_LARGE: &str = "chapter number is too large";

/// Persisted shape of a chapter document. The number is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct ChapterRecord {
    pub name: String,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

/// Persisted shape of one section summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SectionRecord {
    pub id: String,
    pub name: String,
}

/// Chapter document with its position in the order array.
pub(crate) struct PositionedChapter {
    pub document: Document,
    pub record: ChapterRecord,
    pub number: ChapterNumber,
}

/// Chapter persistence over an injected document store.
pub struct ChapterRepository<S> {
    store: S,
}

impl<S: DocumentStore> ChapterRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts a new chapter at `number`, shifting later chapters by one.
    pub fn insert_chapter(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        name: &Name,
        number: ChapterNumber,
    ) -> RepoResult<Chapter> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let chapter_ids = project.chapter_ids();
        if number.get() > chapter_ids.len() + 1 {
            return Err(RepoError::InvalidArgument(
                CHAPTER_NUMBER_TOO_LARGE.to_string(),
            ));
        }

        let chapter_id = self.store.new_id();
        let rebuilt = splice_in(chapter_ids, number.index(), &chapter_id);
        let collection = chapters_path(project_id);
        let record = ChapterRecord {
            name: name.as_str().to_string(),
            sections: Vec::new(),
        };
        let writes = vec![
            WriteOp::create(collection.as_str(), chapter_id.as_str(), &record)
                .map_err(RepoError::Write)?,
            project_write(project_id, &project.with_chapter_ids(rebuilt))?,
        ];
        self.store.commit(writes).map_err(RepoError::Write)?;
        info!(
            "event=chapter_insert module=repo status=ok project_id={project_id} chapter_id={chapter_id} number={}",
            number.get()
        );

        let document = self
            .store
            .get(&collection, &chapter_id)
            .map_err(RepoError::Read)?;
        parse_chapter(&collection, &document, number)
    }

    /// Renames a chapter and moves it to `number` when that differs from its
    /// current position.
    pub fn update_chapter(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
        name: &Name,
        number: ChapterNumber,
    ) -> RepoResult<Chapter> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let chapter_ids = project.chapter_ids();
        if number.get() > chapter_ids.len() {
            return Err(RepoError::InvalidArgument(
                CHAPTER_NUMBER_TOO_LARGE.to_string(),
            ));
        }

        let collection = chapters_path(project_id);
        let current = load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        let record = ChapterRecord {
            name: name.as_str().to_string(),
            ..current.record
        };

        let mut writes = vec![
            WriteOp::update(collection.as_str(), chapter_id.as_str(), &record)
                .map_err(RepoError::Write)?,
        ];
        let moved = current.number != number;
        if moved {
            let rebuilt = relocate(chapter_ids, current.number.index(), number.index());
            writes.push(project_write(project_id, &project.with_chapter_ids(rebuilt))?);
        }
        self.store.commit(writes).map_err(RepoError::Write)?;
        info!(
            "event=chapter_update module=repo status=ok project_id={project_id} chapter_id={chapter_id} from={} to={} moved={moved}",
            current.number.get(),
            number.get()
        );

        let document = get_document(&self.store, &collection, chapter_id, "chapter")?;
        parse_chapter(&collection, &document, number)
    }

    /// Loads every chapter of a project keyed by id, each numbered from the
    /// order array.
    ///
    /// Fails when a chapter document is missing from the order array, or
    /// when the order array lists more ids than there are chapter documents.
    pub fn fetch_project_chapters(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> RepoResult<HashMap<ChapterId, Chapter>> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let collection = chapters_path(project_id);
        let documents = self.store.list(&collection).map_err(RepoError::Read)?;

        let positions = project
            .chapter_ids()
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index))
            .collect::<HashMap<_, _>>();

        let mut chapters = HashMap::with_capacity(documents.len());
        for document in &documents {
            let Some(&index) = positions.get(document.id.as_str()) else {
                error!(
                    "event=chapter_fetch module=repo status=error error_code=chapter_ids_deficient project_id={project_id} chapter_id={}",
                    document.id
                );
                return Err(RepoError::Integrity(DEFICIENT_CHAPTER_IDS));
            };
            let chapter = parse_chapter(&collection, document, ChapterNumber::from_index(index))?;
            chapters.insert(chapter.id.clone(), chapter);
        }

        if chapters.len() < project.chapter_ids().len() {
            error!(
                "event=chapter_fetch module=repo status=error error_code=chapter_ids_excessive project_id={project_id} found={} listed={}",
                chapters.len(),
                project.chapter_ids().len()
            );
            return Err(RepoError::Integrity(EXCESSIVE_CHAPTER_IDS));
        }
        Ok(chapters)
    }

    /// Loads one chapter with its computed number.
    pub fn get_chapter(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
    ) -> RepoResult<Chapter> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let chapter = load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;
        parse_chapter(&chapters_path(project_id), &chapter.document, chapter.number)
    }

    /// Deletes a chapter, its graph and paper documents, and its slot in the
    /// order array in one batch.
    pub fn delete_chapter(
        &self,
        project_id: &ProjectId,
        chapter_id: &ChapterId,
        user_id: &UserId,
    ) -> RepoResult<()> {
        let project = load_owned_project(&self.store, project_id, user_id)?.record;
        let chapter = load_positioned_chapter(&self.store, project_id, &project, chapter_id)?;

        let mut remaining = project.chapter_ids().to_vec();
        remaining.remove(chapter.number.index());

        let mut writes = vec![WriteOp::delete(chapters_path(project_id), chapter_id.as_str())];
        for collection in [
            graphs_path(project_id, chapter_id),
            papers_path(project_id, chapter_id),
        ] {
            let documents = self.store.list(&collection).map_err(RepoError::Read)?;
            writes.extend(
                documents
                    .into_iter()
                    .map(|document| WriteOp::delete(collection.as_str(), document.id)),
            );
        }
        writes.push(project_write(project_id, &project.with_chapter_ids(remaining))?);

        self.store.commit(writes).map_err(RepoError::Write)?;
        info!(
            "event=chapter_delete module=repo status=ok project_id={project_id} chapter_id={chapter_id} number={}",
            chapter.number.get()
        );
        Ok(())
    }
}

/// Loads a chapter document and locates it in the project's order array.
pub(crate) fn load_positioned_chapter<S: DocumentStore>(
    store: &S,
    project_id: &ProjectId,
    project: &ProjectRecord,
    chapter_id: &ChapterId,
) -> RepoResult<PositionedChapter> {
    let document = get_document(store, &chapters_path(project_id), chapter_id, "chapter")?;
    let record: ChapterRecord = document.decode().map_err(RepoError::Read)?;
    let index = project
        .chapter_ids()
        .iter()
        .position(|id| id == chapter_id.as_str())
        .ok_or(RepoError::Integrity(DEFICIENT_CHAPTER_IDS))?;
    Ok(PositionedChapter {
        document,
        record,
        number: ChapterNumber::from_index(index),
    })
}

pub(crate) fn parse_chapter(
    collection: &str,
    document: &Document,
    number: ChapterNumber,
) -> RepoResult<Chapter> {
    let record: ChapterRecord = document.decode().map_err(RepoError::Read)?;
    let doc_id = document.id.as_str();
    let sections = record
        .sections
        .into_iter()
        .map(|section| -> RepoResult<SectionSummary> {
            Ok(SectionSummary {
                id: persisted(Id::parse("section id", section.id), collection, doc_id)?,
                name: persisted(Name::parse("name", section.name), collection, doc_id)?,
            })
        })
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(Chapter {
        id: persisted(Id::parse("chapter id", doc_id), collection, doc_id)?,
        name: persisted(Name::parse("name", record.name), collection, doc_id)?,
        number,
        sections,
        created_at: document.created_at,
        updated_at: document.updated_at,
    })
}

fn project_write(project_id: &ProjectId, record: &ProjectRecord) -> RepoResult<WriteOp> {
    WriteOp::update(PROJECTS, project_id.as_str(), record).map_err(RepoError::Write)
}

/// Returns `ids` with `id` placed at `index` and the remainder shifted by one.
///
/// `index` must be at most `ids.len()`.
pub(crate) fn splice_in(ids: &[String], index: usize, id: &str) -> Vec<String> {
    let mut rebuilt = Vec::with_capacity(ids.len() + 1);
    rebuilt.extend_from_slice(&ids[..index]);
    rebuilt.push(id.to_string());
    rebuilt.extend_from_slice(&ids[index..]);
    rebuilt
}

/// Moves the id at `from` to slot `to`, closing the gap it leaves behind.
///
/// Both indexes must be below `ids.len()`.
pub(crate) fn relocate(ids: &[String], from: usize, to: usize) -> Vec<String> {
    let mut shortened = ids.to_vec();
    let id = shortened.remove(from);
    splice_in(&shortened, to, &id)
}

#[cfg(test)]
mod tests {
    use super::{relocate, splice_in};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn splice_in_places_id_and_shifts_tail() {
        let base = ids(&["a", "b", "c"]);
        assert_eq!(splice_in(&base, 0, "x"), ids(&["x", "a", "b", "c"]));
        assert_eq!(splice_in(&base, 1, "x"), ids(&["a", "x", "b", "c"]));
        assert_eq!(splice_in(&base, 3, "x"), ids(&["a", "b", "c", "x"]));
        assert_eq!(splice_in(&[], 0, "x"), ids(&["x"]));
    }

    #[test]
    fn relocate_moves_forward_and_backward() {
        let base = ids(&["a", "b", "c", "d"]);
        assert_eq!(relocate(&base, 0, 2), ids(&["b", "c", "a", "d"]));
        assert_eq!(relocate(&base, 3, 0), ids(&["d", "a", "b", "c"]));
        assert_eq!(relocate(&base, 1, 3), ids(&["a", "c", "d", "b"]));
        assert_eq!(relocate(&base, 2, 2), base);
    }
}
