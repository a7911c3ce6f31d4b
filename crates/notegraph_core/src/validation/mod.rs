//! Request-shaped validators producing mirrored error structures.
//!
//! # Responsibility
//! - Turn untrusted, already-deserialized request data into validated
//!   domain values.
//! - Report every offending field in one pass, shaped like the input so a
//!   client can zip errors to inputs by index.
//!
//! # Invariants
//! - Validators are pure: no I/O, no shared state, never panic.
//! - An empty string in an error slot means "no error for this field".

pub mod graph_tree;
pub mod section_list;

use crate::model::value::ValueResult;

/// Returns the message of a failed field, or an empty string when valid.
pub(crate) fn message_of<T>(result: &ValueResult<T>) -> String {
    match result {
        Ok(_) => String::new(),
        Err(err) => err.message().to_string(),
    }
}
