//! Default handling for ordinary (non-package) patch classes.

use crate::error::{PatchError, PatchResult};
use crate::patcher::ClassSetPatcher;
use crate::session::PatchSession;
use classpatch_types::annotation::{Action, PatchAnnotation};
use classpatch_types::class::{ClassDef, Member};
use classpatch_types::ids::{ClassId, is_class_descriptor, resolve_type_name};
use classpatch_types::marker;
use classpatch_types::report::Level;

/// Class-level add/edit/replace/remove.
///
/// Targets are claimed during prepare and any conflict with an earlier claim is fatal for the
/// patch class.
#[derive(Debug, Default)]
pub struct GenericPatcher {
    target: Option<ClassId>,
}

impl GenericPatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_target(patch_id: &ClassId, annotation: &PatchAnnotation) -> PatchResult<ClassId> {
        match (annotation.target(), annotation.target_class()) {
            (Some(_), Some(_)) => Err(PatchError::invalid_element(marker::ELEM_TARGET_CLASS)),
            (None, Some(target_class)) => Ok(target_class.clone()),
            (Some(target), None) if is_class_descriptor(target) => {
                Ok(ClassId::from_descriptor(target)?)
            }
            (Some(target), None) => {
                Ok(ClassId::from_type_name(&resolve_type_name(patch_id, target))?)
            }
            (None, None) => Ok(patch_id.clone()),
        }
    }

    fn claim_target(
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        annotation: &PatchAnnotation,
    ) -> PatchResult<ClassId> {
        let target = Self::resolve_target(patch_id, annotation)?;
        if session.should_log_target(patch_id, &target) {
            session.extend_log_prefix_with_target_label(&target.label());
        }
        if !session.source().contains(&target) {
            return Err(PatchError::TargetNotFound { id: target });
        }
        session.add_target(&target, patch_id, false)?;
        Ok(target)
    }

    fn take_target(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        annotation: &PatchAnnotation,
    ) -> PatchResult<ClassId> {
        match self.target.take() {
            Some(target) => Ok(target),
            None => Self::claim_target(session, patch_id, annotation),
        }
    }

    fn original(session: &PatchSession<'_>, target: &ClassId) -> PatchResult<ClassDef> {
        session
            .source()
            .get(target)
            .cloned()
            .ok_or_else(|| PatchError::TargetNotFound { id: target.clone() })
    }
}

impl ClassSetPatcher for GenericPatcher {
    fn on_prepare(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        _patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        self.target = None;
        if annotation.recursive() {
            return Err(PatchError::invalid_element(marker::ELEM_RECURSIVE));
        }
        if annotation.content_only() && !matches!(annotation.action, Action::Edit | Action::Replace)
        {
            return Err(PatchError::invalid_element(marker::ELEM_CONTENT_ONLY));
        }
        match annotation.action {
            Action::Add => {
                if annotation.target().is_some() {
                    return Err(PatchError::invalid_element(marker::ELEM_TARGET));
                }
                if annotation.target_class().is_some() {
                    return Err(PatchError::invalid_element(marker::ELEM_TARGET_CLASS));
                }
                if session.source().contains(patch_id) {
                    return Err(PatchError::AlreadyExists {
                        id: patch_id.clone(),
                    });
                }
            }
            Action::Edit | Action::Replace | Action::Remove => {
                self.target = Some(Self::claim_target(session, patch_id, annotation)?);
            }
            Action::Ignore => {}
        }
        Ok(())
    }

    fn on_add(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        _annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        let patched = session.simple_add(patch);
        session.add_patched(patch_id, patched)
    }

    fn on_edit(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        let target = self.take_target(session, patch_id, annotation)?;
        let original = Self::original(session, &target)?;
        let patched = edit_class(&original, patch, annotation.content_only());
        session.add_patched(patch_id, patched)
    }

    fn on_replace(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        let target = self.take_target(session, patch_id, annotation)?;
        let mut patched = session.simple_add(patch);
        patched.ty = target.clone();
        if annotation.content_only() {
            let original = Self::original(session, &target)?;
            copy_class_attributes(&original, &mut patched);
        }
        session.add_patched(patch_id, patched)
    }

    fn on_remove(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        _patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        let target = self.take_target(session, patch_id, annotation)?;
        if session.is_logging(Level::Debug) {
            session.log(Level::Debug, &format!("remove type '{}'", target.label()));
        }
        Ok(())
    }
}

/// Merge `patch` into `original`. Members match by name and descriptor; the patch wins.
fn edit_class(original: &ClassDef, patch: &ClassDef, content_only: bool) -> ClassDef {
    let mut out = patch.without_patch();
    out.ty = original.ty.clone();
    if content_only {
        copy_class_attributes(original, &mut out);
    }
    out.fields = merge_members(&original.fields, &patch.fields);
    out.methods = merge_members(&original.methods, &patch.methods);
    out
}

fn copy_class_attributes(from: &ClassDef, to: &mut ClassDef) {
    to.access = from.access.clone();
    to.superclass = from.superclass.clone();
    to.interfaces = from.interfaces.clone();
}

fn merge_members(original: &[Member], patch: &[Member]) -> Vec<Member> {
    let mut out: Vec<Member> = original
        .iter()
        .map(|m| {
            patch
                .iter()
                .find(|p| p.same_signature(m))
                .unwrap_or(m)
                .clone()
        })
        .collect();
    for p in patch {
        if !original.iter().any(|m| m.same_signature(p)) {
            out.push(p.clone());
        }
    }
    out
}
