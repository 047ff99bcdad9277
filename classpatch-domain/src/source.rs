use crate::error::{PatchError, PatchResult};
use classpatch_types::class::ClassDef;
use classpatch_types::ids::ClassId;
use std::collections::HashMap;

/// Result of claiming a source class for a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMark {
    /// The class was unclaimed and now belongs to the claimant.
    Marked,
    /// The claimant already owned the class; nothing changed.
    Unchanged,
}

/// The original classes being patched, in insertion order.
///
/// Entries are never added or dropped while patches are processed; a patch "consumes" a source
/// class by claiming it, and claimed classes are left out of the output.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    classes: Vec<ClassDef>,
    index: HashMap<ClassId, usize>,
    claims: HashMap<ClassId, ClassId>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class. Fails if a class with the same identifier is already present.
    pub fn insert(&mut self, class: ClassDef) -> PatchResult<()> {
        if self.index.contains_key(&class.ty) {
            return Err(PatchError::AlreadyExists { id: class.ty });
        }
        self.index.insert(class.ty.clone(), self.classes.len());
        self.classes.push(class);
        Ok(())
    }

    /// Add every class in order, keeping the first of each identifier.
    ///
    /// Returns the identifiers of the dropped duplicates, in input order.
    pub fn insert_all<I: IntoIterator<Item = ClassDef>>(&mut self, classes: I) -> Vec<ClassId> {
        let mut dropped = Vec::new();
        for class in classes {
            if let Err(PatchError::AlreadyExists { id }) = self.insert(class) {
                dropped.push(id);
            }
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ClassId) -> Option<&ClassDef> {
        self.index.get(id).map(|&i| &self.classes[i])
    }

    /// Snapshot of all identifiers in insertion order.
    pub fn keys(&self) -> Vec<ClassId> {
        self.classes.iter().map(|c| c.ty.clone()).collect()
    }

    /// Claim `id` for the patch class `claimant`.
    pub fn mark_targeted(
        &mut self,
        id: &ClassId,
        claimant: &ClassId,
        allow_overwrite: bool,
    ) -> PatchResult<TargetMark> {
        if !self.contains(id) {
            return Err(PatchError::TargetNotFound { id: id.clone() });
        }
        match self.claims.get(id) {
            Some(owner) if owner == claimant => return Ok(TargetMark::Unchanged),
            Some(_) if !allow_overwrite => {
                return Err(PatchError::AlreadyTargeted { id: id.clone() });
            }
            _ => {}
        }
        self.claims.insert(id.clone(), claimant.clone());
        Ok(TargetMark::Marked)
    }

    pub fn is_targeted(&self, id: &ClassId) -> bool {
        self.claims.contains_key(id)
    }

    pub fn targeted_by(&self, id: &ClassId) -> Option<&ClassId> {
        self.claims.get(id)
    }

    pub fn targeted_count(&self) -> usize {
        self.claims.len()
    }

    /// Unclaimed classes, in insertion order.
    pub fn untargeted(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes
            .iter()
            .filter(|c| !self.claims.contains_key(&c.ty))
    }
}

impl FromIterator<ClassDef> for SourceSet {
    /// Later duplicates are dropped.
    fn from_iter<I: IntoIterator<Item = ClassDef>>(iter: I) -> Self {
        let mut set = SourceSet::new();
        set.insert_all(iter);
        set
    }
}
