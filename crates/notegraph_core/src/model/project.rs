//! Project domain model.
//!
//! # Invariants
//! - `chapter_ids` order is the chapter number order; index `i` holds the
//!   chapter numbered `i + 1`.
//! - Every id in `chapter_ids` resolves to exactly one chapter document and
//!   every chapter document is listed exactly once.

use crate::model::value::{ChapterId, Description, Name, ProjectId, UserId};
use serde::Serialize;

/// Top-level container of chapters, owned by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: Name,
    pub description: Description,
    /// Only the author can see or mutate the project.
    pub author_id: UserId,
    /// Authoritative chapter order.
    pub chapter_ids: Vec<ChapterId>,
    /// Epoch ms creation timestamp, stamped by the store.
    pub created_at: i64,
    /// Epoch ms update timestamp, stamped by the store.
    pub updated_at: i64,
}
