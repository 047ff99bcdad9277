//! Domain logic: overlay a patch class set onto a source class set.
//!
//! This crate owns *how* each patch directive is resolved against the source set. It does not
//! own loading or writing class sets; that's the `classpatch-core` crate.

mod diagnostics;
mod error;
mod generic;
mod package;
mod patcher;
mod session;
mod source;

pub use diagnostics::{DiagnosticCounts, Diagnostics, MemoryDiagnostics};
pub use error::{PatchError, PatchResult};
pub use generic::GenericPatcher;
pub use package::{PackagePatcher, is_package_id};
pub use patcher::{ClassSetPatcher, process_patch};
pub use session::PatchSession;
pub use source::{SourceSet, TargetMark};
