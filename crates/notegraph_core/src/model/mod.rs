//! Domain model for projects, chapters and their sections.
//!
//! # Responsibility
//! - Define canonical read models used by repositories and services.
//! - Define validated value objects for every primitive field.
//!
//! # Invariants
//! - Read models only hold validated value objects; persisted documents that
//!   fail validation are rejected on read instead of being masked.

pub mod chapter;
pub mod graph;
pub mod paper;
pub mod project;
pub mod value;
