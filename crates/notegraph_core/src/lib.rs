//! Core domain logic for notegraph: projects split into ordered chapters,
//! chapters split into sections, each section backed by a concept graph.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::chapter::{Chapter, SectionSummary};
pub use model::graph::{Graph, GraphChild, SectionDraft};
pub use model::paper::Paper;
pub use model::project::Project;
pub use model::value::{ChapterNumber, Content, Description, Id, Name, Relation, ValueError};
pub use repo::document_store::{
    Document, DocumentStore, SqliteDocumentStore, StoreError, StoreResult, WriteOp,
};
pub use repo::{RepoError, RepoResult};
pub use service::chapter_service::{ChapterFieldErrors, ChapterService, ChapterServiceError};
pub use service::graph_service::{GraphFieldErrors, GraphService, GraphServiceError};
pub use service::paper_service::{PaperFieldErrors, PaperService, PaperServiceError};
pub use service::project_service::{ProjectFieldErrors, ProjectService, ProjectServiceError};
pub use service::ErrorKind;
pub use validation::graph_tree::{
    validate_graph_children, GraphChildErrors, GraphChildrenErrors, RawGraphChild,
};
pub use validation::section_list::{
    validate_section_list, RawSection, SectionErrors, SectionListErrors,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
