//! Embeddable core library for classpatch.
//!
//! Provides a clap-free, I/O-abstracted entry point for merging a patch class set onto a
//! source class set.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ClassSetSource`](ports::ClassSetSource) - load the source and patch documents
//! - [`WritePort`](ports::WritePort) - write files and create directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_merge`](pipeline::run_merge) - load, merge and build a report
//! - [`merge_class_sets`](pipeline::merge_class_sets) - the merge itself, on in-memory documents
//! - [`write_merge_artifacts`](pipeline::write_merge_artifacts) - persist an outcome

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export the diagnostics port so callers don't need classpatch-domain directly.
pub use classpatch_domain::{Diagnostics, MemoryDiagnostics};
