//! Validation of the flat section list used to sectionalize a chapter.
//!
//! # Invariants
//! - The list must hold 1..=20 items. A count violation yields one
//!   list-level message, one empty placeholder per input item, and skips
//!   per-item validation.
//! - Within range, every item is validated independently.

use crate::model::graph::SectionDraft;
use crate::model::value::{Content, Name};
use crate::validation::message_of;
use serde::{Deserialize, Serialize};

/// Maximum number of sections accepted in one request.
pub const SECTIONS_MAX_LEN: usize = 20;

/// Untrusted section input without store-assigned fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawSection {
    pub name: String,
    pub content: String,
}

impl RawSection {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Errors for the whole section list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionListErrors {
    /// List-level message. Empty when the item count is in range.
    pub message: String,
    /// One entry per input item, in input order.
    pub items: Vec<SectionErrors>,
}

/// Errors for one section item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionErrors {
    pub name: String,
    pub content: String,
}

impl SectionErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.content.is_empty()
    }
}

/// Validates a section list, returning drafts or the mirrored error list.
pub fn validate_section_list(raw: &[RawSection]) -> Result<Vec<SectionDraft>, SectionListErrors> {
    if let Some(message) = count_violation(raw.len()) {
        return Err(SectionListErrors {
            message,
            items: vec![SectionErrors::default(); raw.len()],
        });
    }

    let mut ok = true;
    let mut drafts = Vec::with_capacity(raw.len());
    let mut items = Vec::with_capacity(raw.len());
    for section in raw {
        let name = Name::parse("name", section.name.as_str());
        let content = Content::parse("content", section.content.as_str());
        items.push(SectionErrors {
            name: message_of(&name),
            content: message_of(&content),
        });
        match (name, content) {
            (Ok(name), Ok(content)) => drafts.push(SectionDraft { name, content }),
            _ => ok = false,
        }
    }

    if ok {
        Ok(drafts)
    } else {
        Err(SectionListErrors {
            message: String::new(),
            items,
        })
    }
}

fn count_violation(len: usize) -> Option<String> {
    if len == 0 {
        return Some("sections are required, but got []".to_string());
    }
    if len > SECTIONS_MAX_LEN {
        return Some(format!(
            "sections length must be less than or equal to {SECTIONS_MAX_LEN}, but got {len}"
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{validate_section_list, RawSection, SectionErrors};

    fn sections(count: usize) -> Vec<RawSection> {
        (0..count)
            .map(|index| RawSection::new(format!("Section {index}"), "body"))
            .collect()
    }

    #[test]
    fn twenty_items_validate_per_item() {
        let drafts = validate_section_list(&sections(20)).expect("20 sections are allowed");
        assert_eq!(drafts.len(), 20);
        assert_eq!(drafts[19].name.as_str(), "Section 19");
    }

    #[test]
    fn twenty_one_items_report_list_message_with_placeholders() {
        let mut raw = sections(21);
        raw[0].name = String::new();

        let errors = validate_section_list(&raw).unwrap_err();
        assert_eq!(
            errors.message,
            "sections length must be less than or equal to 20, but got 21"
        );
        assert_eq!(errors.items.len(), 21);
        assert!(errors.items.iter().all(SectionErrors::is_empty));
    }

    #[test]
    fn empty_list_is_required() {
        let errors = validate_section_list(&[]).unwrap_err();
        assert_eq!(errors.message, "sections are required, but got []");
        assert!(errors.items.is_empty());
    }

    #[test]
    fn per_item_errors_keep_positions() {
        let raw = vec![
            RawSection::new("Intro", "ok"),
            RawSection::new("", "é".repeat(20_001)),
            RawSection::new("Outro", ""),
        ];

        let errors = validate_section_list(&raw).unwrap_err();
        assert_eq!(errors.message, "");
        assert_eq!(errors.items.len(), 3);
        assert!(errors.items[0].is_empty());
        assert_eq!(errors.items[1].name, "name is required, but got ''");
        assert_eq!(
            errors.items[1].content,
            "content must be less than or equal to 40000 bytes, but got 40002 bytes"
        );
        assert!(errors.items[2].is_empty());
    }
}
