//! Clap-free settings for the merge pipeline.

use camino::Utf8PathBuf;
use classpatch_types::annotation::Action;
use classpatch_types::marker::DEFAULT_ANNOTATION_PACKAGE;
use classpatch_types::report::Level;

/// Knobs of the merge itself, independent of where the class sets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Action applied to patch classes that carry no directive.
    pub default_action: Action,

    /// Dotted package holding the directive classes themselves.
    pub annotation_package: String,

    /// Drop patch classes that live in `annotation_package`.
    pub auto_ignore: bool,

    /// Minimum level of recorded diagnostics.
    pub log_level: Level,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            default_action: Action::Add,
            annotation_package: DEFAULT_ANNOTATION_PACKAGE.to_string(),
            auto_ignore: true,
            log_level: Level::Warn,
        }
    }
}

/// Settings for the merge pipeline.
#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub source: Utf8PathBuf,
    pub patch: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub options: MergeOptions,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            source: Utf8PathBuf::from("source.json"),
            patch: Utf8PathBuf::from("patch.json"),
            out_dir: Utf8PathBuf::from("artifacts/classpatch"),
            options: MergeOptions::default(),
        }
    }
}
