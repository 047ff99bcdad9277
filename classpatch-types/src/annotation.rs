use crate::ids::ClassId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a patch class does to its target.
///
/// - add: the patch class is new and is copied into the output
/// - edit: the patch members are merged into the target
/// - replace: the patch class takes the place of the target
/// - remove: the target is dropped
/// - ignore: the patch class is skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Add,
    Edit,
    Replace,
    Remove,
    Ignore,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Add,
        Action::Edit,
        Action::Replace,
        Action::Remove,
        Action::Ignore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Replace => "replace",
            Action::Remove => "remove",
            Action::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Action::ALL
            .into_iter()
            .find(|a| a.name() == lower)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

/// Declarative metadata attached to a patch class.
///
/// Built once per patch class when the patch set is read; read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchAnnotation {
    #[serde(default)]
    pub action: Action,

    /// Explicit target, either a class descriptor or a dotted name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_class: Option<ClassId>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub recursive: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub content_only: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl PatchAnnotation {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_target_class(mut self, target_class: ClassId) -> Self {
        self.target_class = Some(target_class);
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_content_only(mut self, content_only: bool) -> Self {
        self.content_only = content_only;
        self
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn target_class(&self) -> Option<&ClassId> {
        self.target_class.as_ref()
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn content_only(&self) -> bool {
        self.content_only
    }
}
