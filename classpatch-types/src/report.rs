use crate::annotation::Action;
use crate::ids::ClassId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Diagnostic severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,

    /// Context of the message, e.g. `type 'com.app.Foo'`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}: {}: {}", self.level, prefix, self.message),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// A class set file read by the merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    /// `source` or `patch`.
    pub role: String,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    pub classes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub source_classes: u64,
    pub patch_classes: u64,
    pub output_classes: u64,
    /// Source classes claimed by a patch (edited, replaced or removed).
    pub targeted: u64,
    pub errors: u64,
    pub warnings: u64,
}

/// What happened to one patch class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOutcome {
    pub patch: ClassId,
    pub action: Action,

    /// Output class produced from the patch, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ClassId>,

    #[serde(default)]
    pub failed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,

    #[serde(default)]
    pub inputs: Vec<ReportInput>,

    pub counts: ReportCounts,

    #[serde(default)]
    pub outcomes: Vec<PatchOutcome>,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl MergeReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: crate::schema::CLASSPATCH_REPORT_V1.to_string(),
            tool,
            run: RunInfo {
                run_id: Uuid::new_v4(),
                started_at: Some(Utc::now()),
                ended_at: None,
            },
            inputs: vec![],
            counts: ReportCounts::default(),
            outcomes: vec![],
            diagnostics: vec![],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }
}
