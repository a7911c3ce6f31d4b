//! Paper use-case service.
//!
//! # Responsibility
//! - Read and upsert the flat-text paper of a chapter.
//! - Split a paper into section drafts at markdown headings so it can be
//!   sectionalized.
//!
//! # Invariants
//! - Paper content is capped at 40000 UTF-8 bytes.
//! - Drafts are not validated here; `sectionalize` validates them like any
//!   other section list.

use crate::model::paper::Paper;
use crate::model::value::{Content, Id, ValueError};
use crate::repo::document_store::DocumentStore;
use crate::repo::paper_repo::PaperRepository;
use crate::repo::RepoError;
use crate::service::{collect, ErrorKind};
use crate::validation::section_list::RawSection;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^#{1,6}[ \t]+(.*?)(?:[ \t]+#+)?[ \t\r]*$").expect("valid heading regex")
});

/// Field errors of a paper update. Empty strings mean no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperFieldErrors {
    pub content: String,
}

/// Service error for paper use-cases.
#[derive(Debug)]
pub enum PaperServiceError {
    InvalidFields(PaperFieldErrors),
    InvalidArgument(String),
    NotFound(String),
    Repo(RepoError),
}

impl PaperServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFields(_) => ErrorKind::Validation,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for PaperServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFields(errors) => f.write_str(&errors.content),
            Self::InvalidArgument(message) | Self::NotFound(message) => f.write_str(message),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PaperServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PaperServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(message) => Self::NotFound(message),
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValueError> for PaperServiceError {
    fn from(value: ValueError) -> Self {
        Self::InvalidArgument(value.into_message())
    }
}

pub type PaperServiceResult<T> = Result<T, PaperServiceError>;

/// Paper service facade over an injected document store.
pub struct PaperService<S> {
    papers: PaperRepository<S>,
}

impl<S: DocumentStore> PaperService<S> {
    pub fn new(store: S) -> Self {
        Self {
            papers: PaperRepository::new(store),
        }
    }

    /// Returns the chapter's paper, or `None` before the first write.
    pub fn get_paper(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
    ) -> PaperServiceResult<Option<Paper>> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;
        Ok(self.papers.get_paper(&project_id, &chapter_id, &user_id)?)
    }

    /// Creates or replaces the chapter's paper.
    pub fn update_paper(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
        content: &str,
    ) -> PaperServiceResult<Paper> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;

        let mut errors = PaperFieldErrors::default();
        let Some(content) = collect(Content::parse("content", content), &mut errors.content) else {
            return Err(PaperServiceError::InvalidFields(errors));
        };
        Ok(self
            .papers
            .put_paper(&project_id, &chapter_id, &user_id, &content)?)
    }

    /// Splits the stored paper into section drafts. No paper yields no drafts.
    pub fn draft_sections(
        &self,
        project_id: &str,
        chapter_id: &str,
        user_id: &str,
    ) -> PaperServiceResult<Vec<RawSection>> {
        let project_id = Id::parse("project id", project_id)?;
        let chapter_id = Id::parse("chapter id", chapter_id)?;
        let user_id = Id::parse("user id", user_id)?;
        let (chapter, paper) = self
            .papers
            .get_chapter_paper(&project_id, &chapter_id, &user_id)?;
        Ok(paper
            .map(|paper| split_sections(chapter.name.as_str(), paper.content.as_str()))
            .unwrap_or_default())
    }
}

/// Splits markdown text at `#`..`######` heading lines.
///
/// Each heading opens a section named by the heading text; its content is
/// the trimmed text up to the next heading. Non-blank text before the first
/// heading becomes a section named `preamble_name`.
pub fn split_sections(preamble_name: &str, text: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();
    let mut open: Option<&str> = None;
    let mut cursor = 0;

    for captures in HEADING_RE.captures_iter(text) {
        let (Some(heading), Some(title)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        close_section(&mut sections, open, preamble_name, &text[cursor..heading.start()]);
        open = Some(title.as_str());
        cursor = heading.end();
    }
    close_section(&mut sections, open, preamble_name, &text[cursor..]);
    sections
}

fn close_section(sections: &mut Vec<RawSection>, open: Option<&str>, preamble_name: &str, body: &str) {
    let body = body.trim();
    match open {
        Some(name) => sections.push(RawSection::new(name, body)),
        None if !body.is_empty() => sections.push(RawSection::new(preamble_name, body)),
        None => {}
    }
}
