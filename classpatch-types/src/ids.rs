//! Class identifiers and conversions between descriptor, type name and label forms.
//!
//! A class identifier is its type descriptor (`Lcom/example/Foo;`), so converting an
//! identifier to a descriptor and back is lossless. Type names use dots
//! (`com.example.Foo`); labels are the type names shown to users.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("not a class descriptor: '{0}'")]
    NotADescriptor(String),
}

/// Case-sensitive, `/`-delimited class identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassId(String);

impl ClassId {
    pub fn from_descriptor(descriptor: &str) -> Result<Self, IdError> {
        if is_class_descriptor(descriptor) {
            Ok(Self(descriptor.to_string()))
        } else {
            Err(IdError::NotADescriptor(descriptor.to_string()))
        }
    }

    pub fn from_type_name(name: &str) -> Result<Self, IdError> {
        Self::from_descriptor(&type_name_to_descriptor(name))
    }

    pub fn to_descriptor(&self) -> &str {
        &self.0
    }

    /// Human-readable dotted name, e.g. `com.example.Foo`.
    pub fn label(&self) -> String {
        descriptor_to_type_name(&self.0)
    }

    /// Last path segment, e.g. `Foo` for `Lcom/example/Foo;`.
    pub fn simple_name(&self) -> &str {
        let body = &self.0[1..self.0.len() - 1];
        body.rsplit('/').next().unwrap_or(body)
    }

    /// Namespace path including the trailing `/`, or `""` for the root package.
    pub fn package_path(&self) -> &str {
        let body = &self.0[1..self.0.len() - 1];
        match body.rfind('/') {
            Some(idx) => &body[..=idx],
            None => "",
        }
    }

    /// Dotted package name, or `""` for the root package.
    pub fn package_name(&self) -> String {
        self.package_path().trim_end_matches('/').replace('/', ".")
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClassId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClassId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_class_descriptor(&value) {
            Ok(Self(value))
        } else {
            Err(IdError::NotADescriptor(value))
        }
    }
}

impl From<ClassId> for String {
    fn from(id: ClassId) -> Self {
        id.0
    }
}

pub fn is_class_descriptor(s: &str) -> bool {
    s.len() >= 3 && s.starts_with('L') && s.ends_with(';')
}

/// `com.example.Foo` -> `Lcom/example/Foo;`
pub fn type_name_to_descriptor(name: &str) -> String {
    format!("L{};", name.replace('.', "/"))
}

/// `Lcom/example/Foo;` -> `com.example.Foo`. Non-descriptors are returned unchanged.
pub fn descriptor_to_type_name(descriptor: &str) -> String {
    if !is_class_descriptor(descriptor) {
        return descriptor.to_string();
    }
    descriptor[1..descriptor.len() - 1].replace('/', ".")
}

/// Resolve a dotted type name written inside `context`'s package.
///
/// A leading `.` makes the name relative to the package of `context`; any other name is
/// fully qualified. `"."` alone names the package itself.
pub fn resolve_type_name(context: &ClassId, name: &str) -> String {
    let Some(relative) = name.strip_prefix('.') else {
        return name.to_string();
    };
    let package = context.package_name();
    match (package.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => package,
        (false, false) => format!("{}.{}", package, relative),
    }
}
