//! Shared DTOs (schemas-as-code) for the classpatch workspace.
//!
//! # Design constraints
//! - Class sets and reports are serialized to disk.
//! - Class identifiers are validated on construction and on deserialization.
//! - Prefer adding optional fields over changing semantics.

pub mod annotation;
pub mod class;
pub mod ids;
pub mod marker;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const CLASSPATCH_CLASSES_V1: &str = "classpatch.classes.v1";
    pub const CLASSPATCH_REPORT_V1: &str = "classpatch.report.v1";
}
