use crate::error::PatchResult;
use crate::session::PatchSession;
use classpatch_types::annotation::{Action, PatchAnnotation};
use classpatch_types::class::ClassDef;
use classpatch_types::ids::ClassId;

/// Hook points run for every patch class.
///
/// `on_prepare` always runs first; exactly one action hook follows it, chosen by the
/// annotation's action. Implementations may keep state between the two calls.
pub trait ClassSetPatcher {
    fn on_prepare(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()>;

    fn on_add(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()>;

    fn on_edit(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()>;

    fn on_replace(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()>;

    fn on_remove(
        &mut self,
        session: &mut PatchSession<'_>,
        patch_id: &ClassId,
        patch: &ClassDef,
        annotation: &PatchAnnotation,
    ) -> PatchResult<()>;

    fn on_ignore(
        &mut self,
        _session: &mut PatchSession<'_>,
        _patch_id: &ClassId,
        _patch: &ClassDef,
        _annotation: &PatchAnnotation,
    ) -> PatchResult<()> {
        Ok(())
    }
}

/// Run `patcher` over one patch class: prepare, then the action hook.
pub fn process_patch<P: ClassSetPatcher + ?Sized>(
    patcher: &mut P,
    session: &mut PatchSession<'_>,
    patch: &ClassDef,
    annotation: &PatchAnnotation,
) -> PatchResult<()> {
    let patch_id = &patch.ty;
    patcher.on_prepare(session, patch_id, patch, annotation)?;
    match annotation.action {
        Action::Add => patcher.on_add(session, patch_id, patch, annotation),
        Action::Edit => patcher.on_edit(session, patch_id, patch, annotation),
        Action::Replace => patcher.on_replace(session, patch_id, patch, annotation),
        Action::Remove => patcher.on_remove(session, patch_id, patch, annotation),
        Action::Ignore => patcher.on_ignore(session, patch_id, patch, annotation),
    }
}
