//! Package-scoped patch directives.
//!
//! A package is patched through its marker class, `<package>/package-info`. Replacing or
//! removing a marker claims every source class in that package (and, when recursive, in every
//! sub-package) so none of them reach the output unpatched.

use crate::error::{PatchError, PatchResult};
use crate::patcher::ClassSetPatcher;
use crate::session::PatchSession;
use crate::source::TargetMark;
use classpatch_types::annotation::PatchAnnotation;
use classpatch_types::class::ClassDef;
use classpatch_types::ids::{
    ClassId, is_class_descriptor, resolve_type_name, type_name_to_descriptor,
};
use classpatch_types::marker::{self, NAME_PACKAGE_INFO, PACKAGE_INFO_SUFFIX};
use classpatch_types::report::Level;

/// True iff `id` is `L(<path>/)?package-info;`.
pub fn is_package_id(id: &ClassId) -> bool {
    let descriptor = id.to_descriptor();
    descriptor.ends_with(PACKAGE_INFO_SUFFIX) && matches_package_grammar(descriptor)
}

fn matches_package_grammar(descriptor: &str) -> bool {
    let Some(path) = descriptor
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(PACKAGE_INFO_SUFFIX))
    else {
        return false;
    };
    path.is_empty() || path.ends_with('/')
}

/// Whether `descriptor` names a class under `prefix` (a namespace path ending in `/`, or `L`
/// for the root). Non-recursive matching stops at the first nested namespace.
fn in_package(descriptor: &str, prefix: &str, recursive: bool) -> bool {
    let Some(name) = descriptor
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(';'))
    else {
        return false;
    };
    recursive || !name.contains('/')
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Dispatch {
    #[default]
    Generic,
    Package,
}

/// Wraps a [`ClassSetPatcher`] and takes over replace/remove of package markers.
///
/// Every other patch class goes to the wrapped patcher untouched.
#[derive(Debug, Default)]
pub struct PackagePatcher<P> {
    inner: P,
    dispatch: Dispatch,
}

impl<P: ClassSetPatcher> PackagePatcher<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            dispatch: Dispatch::Generic,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// True between a prepare of a package marker and the next prepare.
    pub fn is_processing_package(&self) -> bool {
        self.dispatch == Dispatch::Package
    }

    fn package_target_id(
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        annotation: &PatchAnnotation,
    ) -> PatchResult<ClassId> {
        let mut target_id = patch_id.clone();
        if let Some(target) = annotation.target() {
            let descriptor = if is_class_descriptor(target) {
                target.to_string()
            } else {
                // A bare `.` is the root package, like an empty target.
                let package = match target.strip_prefix('.') {
                    Some("") => String::new(),
                    _ => resolve_type_name(patch_id, target),
                };
                let name = if package.is_empty() {
                    NAME_PACKAGE_INFO.to_string()
                } else {
                    format!("{}.{}", package, NAME_PACKAGE_INFO)
                };
                type_name_to_descriptor(&name)
            };
            target_id = ClassId::from_descriptor(&descriptor)?;
        }
        if !is_package_id(&target_id) {
            return Err(PatchError::not_a_package());
        }
        if annotation.target().is_some() && session.should_log_target(patch_id, &target_id) {
            session.extend_log_prefix_with_target_label(&target_id.label());
        }
        Ok(target_id)
    }

    /// Claim every source class in the package of `target_id` for `claimant`.
    ///
    /// A class already claimed by another patch is reported at ERROR and skipped; the loop
    /// keeps going. Returns the number of classes newly claimed.
    fn remove_package(
        session: &mut PatchSession<'_>,
        claimant: &ClassId,
        target_id: &ClassId,
        recursive: bool,
    ) -> PatchResult<usize> {
        let descriptor = target_id.to_descriptor();
        let prefix = &descriptor[..descriptor.len() - PACKAGE_INFO_SUFFIX.len()];
        let mut removed = 0;
        for id in session.source().keys() {
            if !in_package(id.to_descriptor(), prefix, recursive) {
                continue;
            }
            match session.add_target(&id, claimant, false) {
                Ok(TargetMark::Marked) => {
                    removed += 1;
                    if session.is_logging(Level::Debug) {
                        session.log(Level::Debug, &format!("remove type '{}'", id.label()));
                    }
                }
                Ok(TargetMark::Unchanged) => {}
                Err(PatchError::AlreadyTargeted { .. }) => {
                    session.log(
                        Level::Error,
                        &format!("already targeted type '{}'", id.label()),
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    fn log_package_action(session: &mut PatchSession<'_>, verb: &str, recursive: bool) {
        if session.is_logging(Level::Debug) {
            let scope = if recursive { "recursive" } else { "non-recursive" };
            session.log(Level::Debug, &format!("{} package {}", verb, scope));
        }
    }
}

impl<P: ClassSetPatcher> ClassSetPatcher for PackagePatcher<P> {
    fn on_prepare(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        self.dispatch = if is_package_id(patch_id) {
            Dispatch::Package
        } else {
            Dispatch::Generic
        };
        if self.dispatch == Dispatch::Generic {
            return self.inner.on_prepare(session, patch_id, patch, annotation);
        }
        if annotation.target_class().is_some() {
            return Err(PatchError::invalid_element(marker::ELEM_TARGET_CLASS));
        }
        if annotation.content_only() {
            return Err(PatchError::invalid_element(marker::ELEM_CONTENT_ONLY));
        }
        Ok(())
    }

    fn on_add(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        self.inner.on_add(session, patch_id, patch, annotation)
    }

    fn on_edit(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        self.inner.on_edit(session, patch_id, patch, annotation)
    }

    fn on_replace(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        if self.dispatch == Dispatch::Generic {
            return self.inner.on_replace(session, patch_id, patch, annotation);
        }
        let target_id = Self::package_target_id(session, patch_id, annotation)?;
        let recursive = annotation.recursive();
        Self::log_package_action(session, "replace", recursive);
        Self::remove_package(session, patch_id, &target_id, recursive)?;
        let patched = session.simple_add(patch);
        session.add_patched(patch_id, patched)
    }

    fn on_remove(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        if self.dispatch == Dispatch::Generic {
            return self.inner.on_remove(session, patch_id, patch, annotation);
        }
        let target_id = Self::package_target_id(session, patch_id, annotation)?;
        let recursive = annotation.recursive();
        Self::log_package_action(session, "remove", recursive);
        Self::remove_package(session, patch_id, &target_id, recursive)?;
        Ok(())
    }

    fn on_ignore(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        self.inner.on_ignore(session, patch_id, patch, annotation)
    }
}
