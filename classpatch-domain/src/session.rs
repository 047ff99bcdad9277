use crate::diagnostics::Diagnostics;
use crate::error::{PatchError, PatchResult};
use crate::source::{SourceSet, TargetMark};
use classpatch_types::class::ClassDef;
use classpatch_types::ids::ClassId;
use classpatch_types::report::Level;
use std::collections::{BTreeMap, HashSet};

/// State shared by the patcher hooks for one merge.
///
/// Holds the source set, the output classes produced so far, the patch-to-output mapping, and
/// the log prefix of the patch class being processed.
pub struct PatchSession<'d> {
    source: SourceSet,
    diagnostics: &'d mut dyn Diagnostics,
    output: Vec<ClassDef>,
    output_ids: HashSet<ClassId>,
    patched: BTreeMap<ClassId, ClassId>,
    log_prefix: Option<String>,
}

impl<'d> PatchSession<'d> {
    pub fn new(source: SourceSet, diagnostics: &'d mut dyn Diagnostics) -> Self {
        Self {
            source,
            diagnostics,
            output: Vec::new(),
            output_ids: HashSet::new(),
            patched: BTreeMap::new(),
            log_prefix: None,
        }
    }

    pub fn source(&self) -> &SourceSet {
        &self.source
    }

    /// Start a new patch class: resets the log prefix to `type '<label>'`.
    pub fn begin_class(&mut self, patch_id: &ClassId) {
        self.log_prefix = Some(format!("type '{}'", patch_id.label()));
    }

    pub fn end_class(&mut self) {
        self.log_prefix = None;
    }

    pub fn log_prefix(&self) -> Option<&str> {
        self.log_prefix.as_deref()
    }

    /// Append the target's label to the log prefix for the rest of the current class.
    pub fn extend_log_prefix_with_target_label(&mut self, label: &str) {
        let prefix = match self.log_prefix.take() {
            Some(prefix) => format!("{} -> '{}'", prefix, label),
            None => format!("-> '{}'", label),
        };
        self.log_prefix = Some(prefix);
    }

    pub fn should_log_target(&self, patch_id: &ClassId, target_id: &ClassId) -> bool {
        patch_id != target_id
    }

    pub fn is_logging(&self, level: Level) -> bool {
        self.diagnostics.is_enabled(level)
    }

    pub fn log(&mut self, level: Level, message: &str) {
        self.diagnostics
            .log(level, self.log_prefix.as_deref(), message);
    }

    /// Claim a source class for `claimant`.
    pub fn add_target(
        &mut self,
        id: &ClassId,
        claimant: &ClassId,
        allow_overwrite: bool,
    ) -> PatchResult<TargetMark> {
        self.source.mark_targeted(id, claimant, allow_overwrite)
    }

    /// The patch class as it goes into the output: identical, minus its patch directive.
    pub fn simple_add(&self, patch: &ClassDef) -> ClassDef {
        patch.without_patch()
    }

    /// Put a class produced from `patch_id` into the output.
    pub fn add_patched(&mut self, patch_id: &ClassId, patched: ClassDef) -> PatchResult<()> {
        let result_id = patched.ty.clone();
        self.push_output(patched)?;
        self.patched.insert(patch_id.clone(), result_id);
        Ok(())
    }

    /// Output class produced from `patch_id`, if any.
    pub fn result_for(&self, patch_id: &ClassId) -> Option<&ClassId> {
        self.patched.get(patch_id)
    }

    pub fn output_contains(&self, id: &ClassId) -> bool {
        self.output_ids.contains(id)
    }

    /// Copy every unclaimed source class into the output, in source order.
    ///
    /// Classes whose identifier already exists in the output are reported as errors and
    /// skipped. Returns the number of classes copied.
    pub fn emit_untargeted_sources(&mut self) -> usize {
        let pending: Vec<ClassDef> = self.source.untargeted().cloned().collect();
        let mut copied = 0;
        for class in pending {
            let label = class.ty.label();
            match self.push_output(class) {
                Ok(()) => copied += 1,
                Err(_) => {
                    self.diagnostics.log(
                        Level::Error,
                        Some(format!("type '{}'", label).as_str()),
                        "type already exists in output",
                    );
                }
            }
        }
        copied
    }

    pub fn finish(self) -> (SourceSet, Vec<ClassDef>) {
        (self.source, self.output)
    }

    fn push_output(&mut self, class: ClassDef) -> PatchResult<()> {
        if !self.output_ids.insert(class.ty.clone()) {
            return Err(PatchError::AlreadyExists { id: class.ty });
        }
        self.output.push(class);
        Ok(())
    }
}
