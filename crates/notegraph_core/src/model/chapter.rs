//! Chapter domain model.
//!
//! # Invariants
//! - `number` is derived from the parent project's `chapter_ids` at read
//!   time and is never persisted on the chapter document.
//! - Section summaries are denormalized `{id, name}` pointers to graph
//!   documents keyed by the same id.

use crate::model::value::{ChapterId, ChapterNumber, Name, SectionId};
use serde::Serialize;

/// Chapter read model with its computed position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub name: Name,
    /// 1-based position inside the project.
    pub number: ChapterNumber,
    pub sections: Vec<SectionSummary>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Name-only pointer from a chapter to one of its section graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub id: SectionId,
    pub name: Name,
}
