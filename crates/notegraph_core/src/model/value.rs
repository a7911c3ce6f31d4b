//! Single-field value objects with validating constructors.
//!
//! # Responsibility
//! - Enforce required/length/range rules for every primitive that enters
//!   the core from request data or persisted documents.
//! - Produce human-readable messages whose wording is part of the API
//!   contract.
//!
//! # Invariants
//! - A constructed value always satisfies its rule; there is no unchecked
//!   constructor.
//! - Character limits count Unicode scalar values, byte limits count UTF-8
//!   bytes.
//! - Validation never panics.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length of project/chapter/graph/section names, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum length of a graph child relation label, in characters.
pub const RELATION_MAX_CHARS: usize = 100;
/// Maximum length of descriptions, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 400;
/// Maximum size of paragraphs, paper and section content, in bytes.
pub const CONTENT_MAX_BYTES: usize = 40_000;

pub type ValueResult<T> = Result<T, ValueError>;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    field: &'static str,
    message: String,
}

impl ValueError {
    fn new(field: &'static str, message: String) -> Self {
        Self { field, message }
    }

    /// Field label used in the message, e.g. `name`.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Human-readable message returned to API clients.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consumes the error and returns its message.
    pub fn into_message(self) -> String {
        self.message
    }
}

impl Display for ValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ValueError {}

/// Opaque non-empty identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

/// Identifier of a user (project author).
pub type UserId = Id;
/// Identifier of a project document.
pub type ProjectId = Id;
/// Identifier of a chapter document.
pub type ChapterId = Id;
/// Identifier of a graph document. Equal to its section id.
pub type GraphId = Id;
/// Identifier of a paper document. Equal to its chapter id.
pub type PaperId = Id;
/// Identifier of a section summary.
pub type SectionId = Id;

impl Id {
    pub fn parse(field: &'static str, value: impl Into<String>) -> ValueResult<Self> {
        let value = value.into();
        require(field, &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project, chapter, graph, section or graph child name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Accepts 1..=100 characters.
    pub fn parse(field: &'static str, value: impl Into<String>) -> ValueResult<Self> {
        let value = value.into();
        require(field, &value)?;
        max_chars(field, &value, NAME_MAX_CHARS)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 1-based chapter position inside its project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChapterNumber(usize);

impl ChapterNumber {
    /// Accepts any integer greater than zero.
    pub fn parse(field: &'static str, value: i64) -> ValueResult<Self> {
        match usize::try_from(value) {
            Ok(number) if number > 0 => Ok(Self(number)),
            _ => Err(ValueError::new(
                field,
                format!("{field} must be greater than 0, but got {value}"),
            )),
        }
    }

    /// Builds the number of the chapter stored at `index` of an order array.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Zero-based slot in the order array.
    pub fn index(self) -> usize {
        self.0 - 1
    }
}

/// Paragraph, paper or section body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Content(String);

impl Content {
    /// Accepts at most 40000 UTF-8 bytes. Empty is allowed.
    pub fn parse(field: &'static str, value: impl Into<String>) -> ValueResult<Self> {
        let value = value.into();
        max_bytes(field, &value, CONTENT_MAX_BYTES)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Relation label between a graph node and one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Relation(String);

impl Relation {
    /// Accepts at most 100 characters. Empty is allowed.
    pub fn parse(field: &'static str, value: impl Into<String>) -> ValueResult<Self> {
        let value = value.into();
        max_chars(field, &value, RELATION_MAX_CHARS)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form description of a project or graph child.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    /// Accepts at most 400 characters. Empty is allowed.
    pub fn parse(field: &'static str, value: impl Into<String>) -> ValueResult<Self> {
        let value = value.into();
        max_chars(field, &value, DESCRIPTION_MAX_CHARS)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn require(field: &'static str, value: &str) -> ValueResult<()> {
    if value.is_empty() {
        return Err(ValueError::new(
            field,
            format!("{field} is required, but got '{value}'"),
        ));
    }
    Ok(())
}

fn max_chars(field: &'static str, value: &str, max: usize) -> ValueResult<()> {
    if value.chars().count() > max {
        return Err(ValueError::new(
            field,
            format!("{field} cannot be longer than {max} characters, but got '{value}'"),
        ));
    }
    Ok(())
}

fn max_bytes(field: &'static str, value: &str, max: usize) -> ValueResult<()> {
    let len = value.len();
    if len > max {
        return Err(ValueError::new(
            field,
            format!("{field} must be less than or equal to {max} bytes, but got {len} bytes"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ChapterNumber, Content, Description, Id, Name, Relation};

    #[test]
    fn id_rejects_empty_string() {
        let err = Id::parse("chapter id", "").unwrap_err();
        assert_eq!(err.message(), "chapter id is required, but got ''");
        assert_eq!(err.field(), "chapter id");
        assert_eq!(Id::parse("chapter id", "c1").unwrap().as_str(), "c1");
    }

    #[test]
    fn name_counts_characters_not_bytes() {
        let hundred_kanji = "章".repeat(100);
        assert!(Name::parse("name", hundred_kanji).is_ok());

        let too_long = "a".repeat(101);
        let err = Name::parse("name", too_long.clone()).unwrap_err();
        assert_eq!(
            err.message(),
            format!("name cannot be longer than 100 characters, but got '{too_long}'")
        );
    }

    #[test]
    fn name_is_required() {
        let err = Name::parse("name", "").unwrap_err();
        assert_eq!(err.to_string(), "name is required, but got ''");
    }

    #[test]
    fn chapter_number_must_be_positive() {
        assert_eq!(ChapterNumber::parse("number", 3).unwrap().index(), 2);
        let err = ChapterNumber::parse("number", 0).unwrap_err();
        assert_eq!(err.message(), "number must be greater than 0, but got 0");
        assert!(ChapterNumber::parse("number", -4).is_err());
    }

    #[test]
    fn content_limit_is_measured_in_bytes() {
        assert!(Content::parse("paragraph", "a".repeat(40_000)).is_ok());

        let err = Content::parse("paragraph", "あ".repeat(40_000)).unwrap_err();
        assert_eq!(
            err.message(),
            "paragraph must be less than or equal to 40000 bytes, but got 120000 bytes"
        );
    }

    #[test]
    fn optional_labels_allow_empty_and_cap_length() {
        assert!(Relation::parse("relation", "").is_ok());
        assert!(Description::parse("description", "").is_ok());
        assert!(Relation::parse("relation", "r".repeat(101)).is_err());
        assert!(Description::parse("description", "d".repeat(400)).is_ok());
        assert!(Description::parse("description", "d".repeat(401)).is_err());
    }
}
