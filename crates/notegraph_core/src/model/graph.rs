//! Knowledge-graph section model.
//!
//! A graph document renders one chapter section as a named node with a
//! paragraph and a recursive tree of related child concepts.
//!
//! # Invariants
//! - Sibling child names are unique inside every `children` list, at every
//!   depth. Names may repeat across different parents.

use crate::model::value::{Content, Description, GraphId, Name, Relation};
use serde::Serialize;

/// Graph read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Same value as the section id on the owning chapter.
    pub id: GraphId,
    pub name: Name,
    pub paragraph: Content,
    pub children: Vec<GraphChild>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One node of the recursive child tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphChild {
    pub name: Name,
    pub relation: Relation,
    pub description: Description,
    pub children: Vec<GraphChild>,
}

/// Validated section input used to create graph documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDraft {
    pub name: Name,
    pub content: Content,
}
