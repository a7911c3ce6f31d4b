//! Recursive validation of graph child trees.
//!
//! # Invariants
//! - The error tree has exactly the shape of the input tree: one item per
//!   input node at every depth, including nodes without errors.
//! - A node is built only when its own fields and its whole subtree are
//!   valid; invalid nodes leave an empty slot that is never indexed.
//! - Sibling-name uniqueness is checked per level among built nodes, and is
//!   reported independently of per-item field errors.

use crate::model::graph::GraphChild;
use crate::model::value::{Description, Name, Relation};
use crate::validation::message_of;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Untrusted graph child as delivered by the request layer.
///
/// Also the persisted shape of a child, so stored trees go through the same
/// validation on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGraphChild {
    pub name: String,
    pub relation: String,
    pub description: String,
    pub children: Vec<RawGraphChild>,
}

impl RawGraphChild {
    /// Convenience constructor for a node with empty relation/description.
    pub fn named(name: impl Into<String>, children: Vec<RawGraphChild>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Self::default()
        }
    }
}

impl From<&GraphChild> for RawGraphChild {
    fn from(child: &GraphChild) -> Self {
        Self {
            name: child.name.as_str().to_string(),
            relation: child.relation.as_str().to_string(),
            description: child.description.as_str().to_string(),
            children: child.children.iter().map(Self::from).collect(),
        }
    }
}

/// Errors for one `children` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphChildrenErrors {
    /// Level-wide message, e.g. duplicated sibling names. Empty when none.
    pub message: String,
    /// One entry per input child, in input order.
    pub items: Vec<GraphChildErrors>,
}

/// Errors for one child node and, recursively, its own children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphChildErrors {
    pub name: String,
    pub relation: String,
    pub description: String,
    pub children: GraphChildrenErrors,
}

impl GraphChildrenErrors {
    /// Returns whether this level and every nested level carry no message.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.items.iter().all(GraphChildErrors::is_empty)
    }
}

impl GraphChildErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.relation.is_empty()
            && self.description.is_empty()
            && self.children.is_empty()
    }
}

/// Validates a whole children tree.
///
/// Returns the validated tree, or the mirrored error tree when any node at
/// any depth is invalid or any level has duplicated sibling names.
pub fn validate_graph_children(
    raw: &[RawGraphChild],
) -> Result<Vec<GraphChild>, GraphChildrenErrors> {
    let outcome = validate_level(raw);
    if outcome.ok {
        Ok(outcome.built.into_iter().flatten().collect())
    } else {
        Err(outcome.errors)
    }
}

struct LevelOutcome {
    built: Vec<Option<GraphChild>>,
    errors: GraphChildrenErrors,
    ok: bool,
}

fn validate_level(raw: &[RawGraphChild]) -> LevelOutcome {
    let mut ok = true;
    let mut built = Vec::with_capacity(raw.len());
    let mut items = Vec::with_capacity(raw.len());

    for node in raw {
        let name = Name::parse("name", node.name.as_str());
        let relation = Relation::parse("relation", node.relation.as_str());
        let description = Description::parse("description", node.description.as_str());
        let nested = validate_level(&node.children);

        items.push(GraphChildErrors {
            name: message_of(&name),
            relation: message_of(&relation),
            description: message_of(&description),
            children: nested.errors,
        });

        match (name, relation, description, nested.ok) {
            (Ok(name), Ok(relation), Ok(description), true) => {
                built.push(Some(GraphChild {
                    name,
                    relation,
                    description,
                    children: nested.built.into_iter().flatten().collect(),
                }));
            }
            _ => {
                ok = false;
                built.push(None);
            }
        }
    }

    let message = match first_duplicated_name(&built) {
        Some(name) => {
            ok = false;
            format!("names of children must be unique, but got '{name}' duplicated")
        }
        None => String::new(),
    };

    LevelOutcome {
        built,
        errors: GraphChildrenErrors { message, items },
        ok,
    }
}

fn first_duplicated_name(built: &[Option<GraphChild>]) -> Option<&str> {
    let mut seen = HashSet::new();
    built
        .iter()
        .flatten()
        .map(|child| child.name.as_str())
        .find(|name| !seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::{validate_graph_children, GraphChildErrors, GraphChildrenErrors, RawGraphChild};

    fn leaf(name: &str) -> RawGraphChild {
        RawGraphChild::named(name, Vec::new())
    }

    fn shape(errors: &GraphChildrenErrors) -> Vec<usize> {
        let mut out = vec![errors.items.len()];
        for item in &errors.items {
            out.extend(shape(&item.children));
        }
        out
    }

    fn raw_shape(raw: &[RawGraphChild]) -> Vec<usize> {
        let mut out = vec![raw.len()];
        for node in raw {
            out.extend(raw_shape(&node.children));
        }
        out
    }

    #[test]
    fn empty_children_are_valid() {
        let children = validate_graph_children(&[]).expect("empty list should validate");
        assert!(children.is_empty());
    }

    #[test]
    fn valid_tree_is_built_with_nested_children() {
        let raw = vec![
            RawGraphChild {
                name: "Ownership".to_string(),
                relation: "is part of".to_string(),
                description: "move semantics".to_string(),
                children: vec![leaf("Borrowing"), leaf("Lifetimes")],
            },
            leaf("Traits"),
        ];

        let children = validate_graph_children(&raw).expect("tree should validate");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name.as_str(), "Ownership");
        assert_eq!(children[0].relation.as_str(), "is part of");
        assert_eq!(children[0].children.len(), 2);
        assert_eq!(children[0].children[1].name.as_str(), "Lifetimes");
        assert!(children[1].children.is_empty());
    }

    #[test]
    fn same_name_under_different_parents_is_allowed() {
        let raw = vec![
            RawGraphChild::named("A", vec![leaf("X")]),
            RawGraphChild::named("B", vec![leaf("X")]),
        ];
        assert!(validate_graph_children(&raw).is_ok());
    }

    #[test]
    fn duplicated_siblings_report_on_their_parent_level_only() {
        let raw = vec![
            RawGraphChild::named("A", vec![leaf("X"), leaf("X")]),
            RawGraphChild::named("B", vec![leaf("Y")]),
        ];

        let errors = validate_graph_children(&raw).unwrap_err();
        assert_eq!(errors.message, "");
        assert_eq!(
            errors.items[0].children.message,
            "names of children must be unique, but got 'X' duplicated"
        );
        assert!(errors.items[0].children.items.iter().all(GraphChildErrors::is_empty));
        assert!(errors.items[1].is_empty());
    }

    #[test]
    fn invalid_descendant_marks_ancestors_unbuilt_but_keeps_their_fields_clean() {
        let raw = vec![RawGraphChild::named(
            "Root",
            vec![RawGraphChild::named("Mid", vec![leaf("")])],
        )];

        let errors = validate_graph_children(&raw).unwrap_err();
        let root = &errors.items[0];
        assert_eq!(root.name, "");
        let mid = &root.children.items[0];
        assert_eq!(mid.name, "");
        assert_eq!(mid.children.items[0].name, "name is required, but got ''");
    }

    #[test]
    fn field_errors_and_duplicate_message_are_reported_together() {
        let raw = vec![
            leaf("X"),
            RawGraphChild {
                name: "Bad".to_string(),
                relation: "r".repeat(101),
                ..RawGraphChild::default()
            },
            leaf("X"),
        ];

        let errors = validate_graph_children(&raw).unwrap_err();
        assert_eq!(
            errors.message,
            "names of children must be unique, but got 'X' duplicated"
        );
        assert!(errors.items[0].is_empty());
        assert!(errors.items[1]
            .relation
            .starts_with("relation cannot be longer than 100 characters"));
        assert!(errors.items[2].is_empty());
    }

    #[test]
    fn invalid_sibling_does_not_take_part_in_uniqueness() {
        let raw = vec![
            leaf("X"),
            RawGraphChild {
                name: "X".to_string(),
                description: "d".repeat(401),
                ..RawGraphChild::default()
            },
        ];

        let errors = validate_graph_children(&raw).unwrap_err();
        assert_eq!(errors.message, "");
        assert!(!errors.items[1].description.is_empty());
    }

    #[test]
    fn error_tree_mirrors_input_shape() {
        let raw = vec![
            RawGraphChild::named(
                "A",
                vec![
                    RawGraphChild::named("A1", vec![leaf(""), leaf("A1b")]),
                    leaf("A2"),
                ],
            ),
            leaf(""),
            RawGraphChild::named("C", vec![leaf("C1")]),
        ];

        let errors = validate_graph_children(&raw).unwrap_err();
        assert_eq!(shape(&errors), raw_shape(&raw));
    }

    #[test]
    fn error_tree_serializes_with_nested_items() {
        let errors = validate_graph_children(&[leaf("")]).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["message"], "");
        assert_eq!(json["items"][0]["name"], "name is required, but got ''");
        assert_eq!(json["items"][0]["children"]["items"], serde_json::json!([]));
    }
}
