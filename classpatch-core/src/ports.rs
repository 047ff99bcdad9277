//! Port traits abstracting all I/O away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use classpatch_types::class::ClassSetDoc;

/// A class set document together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedClassSet {
    pub path: Utf8PathBuf,
    /// Hex sha256 of the raw document bytes.
    pub sha256: String,
    pub doc: ClassSetDoc,
}

/// Source of the two class sets being merged.
pub trait ClassSetSource {
    fn load_source_set(&self) -> anyhow::Result<LoadedClassSet>;
    fn load_patch_set(&self) -> anyhow::Result<LoadedClassSet>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
