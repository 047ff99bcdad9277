//! Symbolic class definitions.
//!
//! Only what the merge engine needs is modeled: the identity, class-level attributes and
//! named members. Member bodies are opaque JSON.

use crate::annotation::PatchAnnotation;
use crate::ids::ClassId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub descriptor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Member {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            body: None,
        }
    }

    pub fn same_signature(&self, other: &Member) -> bool {
        self.name == other.name && self.descriptor == other.descriptor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    #[serde(rename = "type")]
    pub ty: ClassId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<ClassId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<ClassId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Member>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Member>,

    /// Patch directive; only meaningful in patch sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<PatchAnnotation>,
}

impl ClassDef {
    pub fn new(ty: ClassId) -> Self {
        Self {
            ty,
            access: vec![],
            superclass: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            patch: None,
        }
    }

    pub fn with_patch(mut self, patch: PatchAnnotation) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn with_method(mut self, method: Member) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: Member) -> Self {
        self.fields.push(field);
        self
    }

    /// Copy of this class with its patch directive stripped.
    pub fn without_patch(&self) -> Self {
        Self {
            patch: None,
            ..self.clone()
        }
    }
}

/// On-disk form of a class set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSetDoc {
    pub schema: String,

    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl ClassSetDoc {
    pub fn new(classes: Vec<ClassDef>) -> Self {
        Self {
            schema: crate::schema::CLASSPATCH_CLASSES_V1.to_string(),
            classes,
        }
    }
}
