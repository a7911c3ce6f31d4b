//! Flat-text rendering of a chapter.

use crate::model::value::{Content, PaperId};
use serde::Serialize;

/// Paper read model, keyed by its chapter id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: PaperId,
    pub content: Content,
    pub created_at: i64,
    pub updated_at: i64,
}
