//! Reserved names shared by patch sets and the merge engine.

/// Simple name of the class that stands for a whole package.
pub const NAME_PACKAGE_INFO: &str = "package-info";

/// Descriptor tail shared by every package marker: the sentinel name plus the closing `;`.
pub const PACKAGE_INFO_SUFFIX: &str = "package-info;";

/// Annotation element names, as reported in diagnostics.
pub const ELEM_TARGET: &str = "target";
pub const ELEM_TARGET_CLASS: &str = "targetClass";
pub const ELEM_RECURSIVE: &str = "recursive";
pub const ELEM_CONTENT_ONLY: &str = "contentOnly";

/// Package that holds the patch annotation types themselves.
///
/// Patch classes under this package are ignored unless auto-ignore is turned off.
pub const DEFAULT_ANNOTATION_PACKAGE: &str = "classpatch.annotation";
