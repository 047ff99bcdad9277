//! The two-pass merge pipeline, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: documents are loaded and artifacts written through
//! the port traits.

use crate::ports::{ClassSetSource, LoadedClassSet, WritePort};
use crate::settings::{MergeOptions, MergeSettings};
use anyhow::Context;
use chrono::Utc;
use classpatch_domain::{
    Diagnostics, GenericPatcher, MemoryDiagnostics, PackagePatcher, PatchSession, SourceSet,
    process_patch,
};
use classpatch_render::render_report_md;
use classpatch_types::annotation::{Action, PatchAnnotation};
use classpatch_types::class::{ClassDef, ClassSetDoc};
use classpatch_types::report::{
    Level, MergeReport, PatchOutcome, ReportCounts, ReportInput, ToolInfo,
};
use tracing::{debug, info};

/// Error type for pipeline results. Both map to exit code 1 in the CLI.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("merge reported {errors} error(s)")]
    Patch { errors: u64 },
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// What the merge itself produced, before any report is attached.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub classes: Vec<ClassDef>,
    pub outcomes: Vec<PatchOutcome>,
    pub source_classes: u64,
    pub patch_classes: u64,
    pub targeted: u64,
}

/// Outcome of `run_merge`.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub classes: ClassSetDoc,
    pub report: MergeReport,
}

impl MergeOutcome {
    /// `Err(ToolError::Patch)` when any ERROR diagnostic was recorded.
    pub fn check(&self) -> Result<(), ToolError> {
        if self.report.has_errors() {
            return Err(ToolError::Patch {
                errors: self.report.counts.errors,
            });
        }
        Ok(())
    }
}

/// Index a class set, reporting and dropping later duplicates.
fn index_classes(
    classes: &[ClassDef],
    role: &str,
    diagnostics: &mut dyn Diagnostics,
) -> SourceSet {
    let mut set = SourceSet::new();
    for id in set.insert_all(classes.iter().cloned()) {
        diagnostics.log(
            Level::Error,
            Some(format!("type '{}'", id.label()).as_str()),
            &format!("duplicate type in {} set", role),
        );
    }
    set
}

fn is_annotation_class(class: &ClassDef, options: &MergeOptions) -> bool {
    options.auto_ignore && class.ty.package_name() == options.annotation_package
}

/// Overlay `patch` onto `source`.
///
/// Every patch class is processed in document order; a failing patch class is logged at
/// ERROR and skipped. Unclaimed source classes are then appended in source order.
pub fn merge_class_sets(
    source: &ClassSetDoc,
    patch: &ClassSetDoc,
    options: &MergeOptions,
    diagnostics: &mut dyn Diagnostics,
) -> MergeResult {
    let source_set = index_classes(&source.classes, "source", diagnostics);
    let patches = index_classes(&patch.classes, "patch", diagnostics);
    let source_classes = source_set.len() as u64;
    let patch_classes = patches.len() as u64;

    let mut session = PatchSession::new(source_set, diagnostics);
    let mut patcher = PackagePatcher::new(GenericPatcher::new());
    let mut outcomes = Vec::with_capacity(patches.len());

    for id in patches.keys() {
        let Some(class) = patches.get(&id) else {
            continue;
        };
        session.begin_class(&id);
        if is_annotation_class(class, options) {
            if session.is_logging(Level::Debug) {
                session.log(Level::Debug, "ignore annotation type");
            }
            outcomes.push(PatchOutcome {
                patch: id.clone(),
                action: Action::Ignore,
                result: None,
                failed: false,
            });
            session.end_class();
            continue;
        }

        let annotation = class
            .patch
            .clone()
            .unwrap_or_else(|| PatchAnnotation::new(options.default_action));
        let failed = match process_patch(&mut patcher, &mut session, class, &annotation) {
            Ok(()) => false,
            Err(e) => {
                session.log(Level::Error, &e.to_string());
                true
            }
        };
        outcomes.push(PatchOutcome {
            patch: id.clone(),
            action: annotation.action,
            result: session.result_for(&id).cloned(),
            failed,
        });
        session.end_class();
    }

    let copied = session.emit_untargeted_sources();
    let (source_set, classes) = session.finish();
    debug!(copied, "source pass complete");

    MergeResult {
        classes,
        outcomes,
        source_classes,
        patch_classes,
        targeted: source_set.targeted_count() as u64,
    }
}

fn report_input(role: &str, loaded: &LoadedClassSet) -> ReportInput {
    ReportInput {
        role: role.to_string(),
        path: loaded.path.to_string(),
        sha256: Some(loaded.sha256.clone()),
        classes: loaded.doc.classes.len() as u64,
    }
}

/// Run the merge pipeline. Returns the merged class set and its report.
///
/// The caller is responsible for writing artifacts (via `WritePort`) or the convenience
/// `write_merge_artifacts` helper, and for turning recorded errors into an exit code.
pub fn run_merge(
    settings: &MergeSettings,
    classes_port: &dyn ClassSetSource,
    tool: ToolInfo,
) -> Result<MergeOutcome, ToolError> {
    let mut report = MergeReport::new(tool);

    let source = classes_port.load_source_set()?;
    let patch = classes_port.load_patch_set()?;

    let mut diagnostics = MemoryDiagnostics::new(settings.options.log_level).with_echo(true);
    let merged = merge_class_sets(&source.doc, &patch.doc, &settings.options, &mut diagnostics);
    let counts = diagnostics.counts();

    report.inputs = vec![report_input("source", &source), report_input("patch", &patch)];
    report.counts = ReportCounts {
        source_classes: merged.source_classes,
        patch_classes: merged.patch_classes,
        output_classes: merged.classes.len() as u64,
        targeted: merged.targeted,
        errors: counts.errors,
        warnings: counts.warnings,
    };
    report.outcomes = merged.outcomes;
    report.diagnostics = diagnostics.into_entries();
    report.run.ended_at = Some(Utc::now());

    info!(
        output = report.counts.output_classes,
        errors = report.counts.errors,
        warnings = report.counts.warnings,
        "merge complete"
    );

    Ok(MergeOutcome {
        classes: ClassSetDoc::new(merged.classes),
        report,
    })
}

/// Write all merge artifacts to the output directory.
pub fn write_merge_artifacts(
    outcome: &MergeOutcome,
    out_dir: &camino::Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let classes_json =
        serde_json::to_string_pretty(&outcome.classes).context("serialize classes")?;
    writer.write_file(&out_dir.join("classes.json"), classes_json.as_bytes())?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryClassSetSource;
    use camino::Utf8Path;
    use classpatch_types::ids::ClassId;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemWritePort {
        files: Mutex<HashMap<String, Vec<u8>>>,
        dirs: Mutex<Vec<String>>,
    }

    impl WritePort for MemWritePort {
        fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
            let key = path.as_str().replace('\\', "/");
            self.files
                .lock()
                .expect("lock files")
                .insert(key, contents.to_vec());
            Ok(())
        }

        fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
            let key = path.as_str().replace('\\', "/");
            self.dirs.lock().expect("lock dirs").push(key);
            Ok(())
        }
    }

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "classpatch".into(),
            version: Some("0.0.0-test".into()),
        }
    }

    fn class(descriptor: &str) -> ClassDef {
        ClassDef::new(ClassId::from_descriptor(descriptor).unwrap())
    }

    fn ids(classes: &[ClassDef]) -> Vec<&str> {
        classes.iter().map(|c| c.ty.to_descriptor()).collect()
    }

    #[test]
    fn duplicates_are_reported_and_dropped() {
        let source = ClassSetDoc::new(vec![class("La/A;"), class("La/A;")]);
        let patch = ClassSetDoc::new(vec![]);
        let mut diagnostics = MemoryDiagnostics::new(Level::Info);

        let merged = merge_class_sets(&source, &patch, &MergeOptions::default(), &mut diagnostics);

        assert_eq!(merged.source_classes, 1);
        assert_eq!(ids(&merged.classes), vec!["La/A;"]);
        assert_eq!(
            diagnostics.messages(Level::Error),
            vec!["duplicate type in source set"]
        );
    }

    #[test]
    fn undirected_patches_use_the_default_action() {
        let source = ClassSetDoc::new(vec![class("La/A;")]);
        let patch = ClassSetDoc::new(vec![class("La/A;")]);
        let options = MergeOptions {
            default_action: Action::Replace,
            ..MergeOptions::default()
        };
        let mut diagnostics = MemoryDiagnostics::new(Level::Info);

        let merged = merge_class_sets(&source, &patch, &options, &mut diagnostics);

        assert_eq!(merged.outcomes[0].action, Action::Replace);
        assert_eq!(merged.targeted, 1);
        assert_eq!(ids(&merged.classes), vec!["La/A;"]);
        assert_eq!(diagnostics.counts().errors, 0);
    }

    #[test]
    fn annotation_package_is_ignored_unless_disabled() {
        let source = ClassSetDoc::new(vec![]);
        let patch = ClassSetDoc::new(vec![class("Lclasspatch/annotation/Edit;")]);

        let mut diagnostics = MemoryDiagnostics::new(Level::Info);
        let merged = merge_class_sets(&source, &patch, &MergeOptions::default(), &mut diagnostics);
        assert!(merged.classes.is_empty());
        assert_eq!(merged.outcomes[0].action, Action::Ignore);

        let options = MergeOptions {
            auto_ignore: false,
            ..MergeOptions::default()
        };
        let mut diagnostics = MemoryDiagnostics::new(Level::Info);
        let merged = merge_class_sets(&source, &patch, &options, &mut diagnostics);
        assert_eq!(ids(&merged.classes), vec!["Lclasspatch/annotation/Edit;"]);
    }

    #[test]
    fn failing_patch_is_logged_and_merge_continues() {
        let source = ClassSetDoc::new(vec![class("La/A;")]);
        let patch = ClassSetDoc::new(vec![
            class("La/Missing;").with_patch(PatchAnnotation::new(Action::Remove)),
            class("La/B;"),
        ]);
        let mut diagnostics = MemoryDiagnostics::new(Level::Info);

        let merged = merge_class_sets(&source, &patch, &MergeOptions::default(), &mut diagnostics);

        assert!(merged.outcomes[0].failed);
        assert!(!merged.outcomes[1].failed);
        assert_eq!(ids(&merged.classes), vec!["La/B;", "La/A;"]);
        let errors: Vec<_> = diagnostics
            .entries()
            .iter()
            .filter(|d| d.level == Level::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].prefix.as_deref(), Some("type 'a.Missing'"));
        assert_eq!(errors[0].message, "target not found: 'a.Missing'");
    }

    #[test]
    fn run_merge_fills_the_report() {
        let source = ClassSetDoc::new(vec![class("La/A;"), class("La/B;")]);
        let patch = ClassSetDoc::new(vec![
            class("La/package-info;").with_patch(PatchAnnotation::new(Action::Remove)),
        ]);
        let port = InMemoryClassSetSource::new(source, patch).unwrap();

        let outcome = run_merge(&MergeSettings::default(), &port, tool()).unwrap();

        assert!(outcome.classes.classes.is_empty());
        assert_eq!(
            outcome.report.counts,
            ReportCounts {
                source_classes: 2,
                patch_classes: 1,
                output_classes: 0,
                targeted: 2,
                errors: 0,
                warnings: 0,
            }
        );
        assert_eq!(outcome.report.inputs.len(), 2);
        assert_eq!(outcome.report.inputs[0].role, "source");
        assert_eq!(outcome.report.inputs[0].sha256.as_deref().map(str::len), Some(64));
        assert!(outcome.report.run.ended_at.is_some());
        assert!(outcome.check().is_ok());
    }

    #[test]
    fn check_fails_when_errors_were_recorded() {
        let source = ClassSetDoc::new(vec![]);
        let patch = ClassSetDoc::new(vec![
            class("La/package-info;").with_patch(
                PatchAnnotation::new(Action::Remove).with_target("La/Foo;"),
            ),
        ]);
        let port = InMemoryClassSetSource::new(source, patch).unwrap();

        let outcome = run_merge(&MergeSettings::default(), &port, tool()).unwrap();

        match outcome.check() {
            Err(ToolError::Patch { errors }) => assert_eq!(errors, 1),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(outcome.report.diagnostics[0].message, "target is not a package");
    }

    #[test]
    fn write_merge_artifacts_writes_all_files() {
        let port = InMemoryClassSetSource::new(
            ClassSetDoc::new(vec![class("La/A;")]),
            ClassSetDoc::new(vec![]),
        )
        .unwrap();
        let outcome = run_merge(&MergeSettings::default(), &port, tool()).unwrap();
        let writer = MemWritePort::default();

        write_merge_artifacts(&outcome, Utf8Path::new("out"), &writer).unwrap();

        let files = writer.files.lock().unwrap();
        let mut names: Vec<&str> = files.keys().map(String::as_str).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["out/classes.json", "out/report.json", "out/report.md"]
        );
        let classes: ClassSetDoc = serde_json::from_slice(&files["out/classes.json"]).unwrap();
        assert_eq!(ids(&classes.classes), vec!["La/A;"]);
        assert_eq!(writer.dirs.lock().unwrap().as_slice(), ["out".to_string()]);
    }
}
