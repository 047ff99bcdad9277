//! Configuration file loading for classpatch.
//!
//! Discovers and loads `classpatch.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use classpatch_core::settings::MergeOptions;
use classpatch_types::annotation::Action;
use classpatch_types::marker::DEFAULT_ANNOTATION_PACKAGE;
use classpatch_types::report::Level;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "classpatch.toml";

/// Top-level configuration from classpatch.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClasspatchConfig {
    pub merge: MergeConfig,
    pub logging: LoggingConfig,
}

/// Merge section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Action for patch classes without a directive.
    pub default_action: Action,

    /// Dotted package holding the directive classes.
    pub annotation_package: String,

    /// Skip patch classes inside `annotation_package`.
    pub auto_ignore: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_action: Action::Add,
            annotation_package: DEFAULT_ANNOTATION_PACKAGE.to_string(),
            auto_ignore: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: Level::Warn }
    }
}

/// Discover the classpatch.toml config file in `dir`.
///
/// Returns `None` if no config file is found.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a classpatch.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ClasspatchConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ClasspatchConfig> {
    let config: ClasspatchConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<ClasspatchConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(ClasspatchConfig::default()),
    }
}

/// CLI values that override the config file when present.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub level: Option<Level>,
    pub default_action: Option<Action>,
    pub annotation_package: Option<String>,
    pub no_auto_ignore: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ClasspatchConfig,
}

impl ConfigMerger {
    pub fn new(config: ClasspatchConfig) -> Self {
        Self { config }
    }

    /// Merge with merge command CLI arguments.
    ///
    /// `no_auto_ignore` can only turn auto-ignore off.
    pub fn merge_cli_args(self, cli: &CliOverrides) -> MergeOptions {
        let merge = self.config.merge;
        MergeOptions {
            default_action: cli.default_action.unwrap_or(merge.default_action),
            annotation_package: cli
                .annotation_package
                .clone()
                .unwrap_or(merge.annotation_package),
            auto_ignore: merge.auto_ignore && !cli.no_auto_ignore,
            log_level: cli.level.unwrap_or(self.config.logging.level),
        }
    }
}
