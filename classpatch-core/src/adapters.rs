//! Default filesystem-backed port implementations.

use crate::ports::{ClassSetSource, LoadedClassSet, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use classpatch_types::class::ClassSetDoc;
use classpatch_types::schema::CLASSPATCH_CLASSES_V1;
use fs_err as fs;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Loads both class sets from JSON files.
#[derive(Debug, Clone)]
pub struct FsClassSetSource {
    pub source: Utf8PathBuf,
    pub patch: Utf8PathBuf,
}

impl FsClassSetSource {
    pub fn new(source: Utf8PathBuf, patch: Utf8PathBuf) -> Self {
        Self { source, patch }
    }
}

impl ClassSetSource for FsClassSetSource {
    fn load_source_set(&self) -> anyhow::Result<LoadedClassSet> {
        load_class_set(&self.source).with_context(|| format!("load source set {}", self.source))
    }

    fn load_patch_set(&self) -> anyhow::Result<LoadedClassSet> {
        load_class_set(&self.patch).with_context(|| format!("load patch set {}", self.patch))
    }
}

fn load_class_set(path: &Utf8Path) -> anyhow::Result<LoadedClassSet> {
    let bytes = fs::read(path)?;
    let doc = parse_class_set(&bytes)?;
    debug!(path = path.as_str(), classes = doc.classes.len(), "loaded class set");
    Ok(LoadedClassSet {
        path: path.to_path_buf(),
        sha256: sha256_hex(&bytes),
        doc,
    })
}

/// Parse a class set document, rejecting unknown schemas.
pub fn parse_class_set(bytes: &[u8]) -> anyhow::Result<ClassSetDoc> {
    let doc: ClassSetDoc = serde_json::from_slice(bytes).context("parse class set json")?;
    if doc.schema != CLASSPATCH_CLASSES_V1 {
        anyhow::bail!(
            "unsupported schema '{}' (expected '{}')",
            doc.schema,
            CLASSPATCH_CLASSES_V1
        );
    }
    Ok(doc)
}

/// In-memory class sets for embedding and testing.
///
/// Digests are taken over the compact JSON form of each document.
#[derive(Debug, Clone)]
pub struct InMemoryClassSetSource {
    source: LoadedClassSet,
    patch: LoadedClassSet,
}

impl InMemoryClassSetSource {
    pub fn new(source: ClassSetDoc, patch: ClassSetDoc) -> anyhow::Result<Self> {
        Ok(Self {
            source: in_memory("<memory:source>", source)?,
            patch: in_memory("<memory:patch>", patch)?,
        })
    }
}

fn in_memory(path: &str, doc: ClassSetDoc) -> anyhow::Result<LoadedClassSet> {
    let bytes = serde_json::to_vec(&doc).context("serialize class set")?;
    Ok(LoadedClassSet {
        path: Utf8PathBuf::from(path),
        sha256: sha256_hex(&bytes),
        doc,
    })
}

impl ClassSetSource for InMemoryClassSetSource {
    fn load_source_set(&self) -> anyhow::Result<LoadedClassSet> {
        Ok(self.source.clone())
    }

    fn load_patch_set(&self) -> anyhow::Result<LoadedClassSet> {
        Ok(self.patch.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
