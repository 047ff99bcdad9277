//! Error types for patch processing.
//!
//! Every variant aborts the current patch class only; the merge driver logs it and moves on
//! to the next patch class.

use classpatch_types::ids::{ClassId, IdError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    /// An annotation element is present but not allowed here.
    #[error("invalid '{element}' element")]
    InvalidElement { element: &'static str },

    /// The resolved target cannot be acted upon.
    #[error("{reason}")]
    InvalidTarget { reason: String },

    /// Another patch already claimed this source class.
    #[error("already targeted type '{}'", .id.label())]
    AlreadyTargeted { id: ClassId },

    #[error("target not found: '{}'", .id.label())]
    TargetNotFound { id: ClassId },

    #[error("type already exists: '{}'", .id.label())]
    AlreadyExists { id: ClassId },

    #[error(transparent)]
    InvalidId(#[from] IdError),
}

impl PatchError {
    pub fn invalid_element(element: &'static str) -> Self {
        PatchError::InvalidElement { element }
    }

    pub fn not_a_package() -> Self {
        PatchError::InvalidTarget {
            reason: "target is not a package".to_string(),
        }
    }

    /// Returns the annotation element name for `InvalidElement` errors.
    pub fn element(&self) -> Option<&'static str> {
        match self {
            PatchError::InvalidElement { element } => Some(element),
            _ => None,
        }
    }

    pub fn is_already_targeted(&self) -> bool {
        matches!(self, PatchError::AlreadyTargeted { .. })
    }
}

pub type PatchResult<T> = Result<T, PatchError>;
