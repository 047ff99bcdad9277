//! Package-scoped replace/remove through `PackagePatcher<GenericPatcher>`.

use classpatch_domain::{
    ClassSetPatcher, GenericPatcher, MemoryDiagnostics, PackagePatcher, PatchError, PatchResult,
    PatchSession, SourceSet, process_patch,
};
use classpatch_types::annotation::{Action, PatchAnnotation};
use classpatch_types::class::ClassDef;
use classpatch_types::ids::ClassId;
use classpatch_types::marker;
use classpatch_types::report::Level;
use pretty_assertions::assert_eq;

const APP_MARKER: &str = "Lcom/app/package-info;";

fn id(s: &str) -> ClassId {
    ClassId::from_descriptor(s).unwrap()
}

fn app_source() -> Vec<&'static str> {
    vec![APP_MARKER, "Lcom/app/A;", "Lcom/app/sub/B;", "Lcom/other/C;"]
}

fn patch(descriptor: &str, annotation: PatchAnnotation) -> ClassDef {
    ClassDef::new(id(descriptor)).with_patch(annotation)
}

struct Run {
    source: SourceSet,
    output: Vec<ClassId>,
    diagnostics: MemoryDiagnostics,
    results: Vec<PatchResult<()>>,
}

impl Run {
    fn claimed(&self) -> Vec<ClassId> {
        self.source
            .keys()
            .into_iter()
            .filter(|k| self.source.is_targeted(k))
            .collect()
    }
}

fn run(source: &[&str], patches: &[ClassDef]) -> Run {
    let source: SourceSet = source.iter().map(|s| ClassDef::new(id(s))).collect();
    let mut diagnostics = MemoryDiagnostics::new(Level::Debug);
    let mut results = Vec::new();
    let (source, output) = {
        let mut session = PatchSession::new(source, &mut diagnostics);
        let mut patcher = PackagePatcher::new(GenericPatcher::new());
        for p in patches {
            let annotation = p.patch.clone().unwrap_or_default();
            session.begin_class(&p.ty);
            results.push(process_patch(&mut patcher, &mut session, p, &annotation));
            session.end_class();
        }
        session.emit_untargeted_sources();
        session.finish()
    };
    Run {
        source,
        output: output.into_iter().map(|c| c.ty).collect(),
        diagnostics,
        results,
    }
}

fn remove(recursive: bool) -> PatchAnnotation {
    PatchAnnotation::new(Action::Remove).with_recursive(recursive)
}

#[test]
fn recursive_remove_claims_the_whole_subtree() {
    let r = run(&app_source(), &[patch(APP_MARKER, remove(true))]);

    assert!(r.results[0].is_ok());
    assert_eq!(
        r.claimed(),
        vec![id(APP_MARKER), id("Lcom/app/A;"), id("Lcom/app/sub/B;")]
    );
    assert_eq!(r.output, vec![id("Lcom/other/C;")]);
    assert_eq!(r.diagnostics.count(Level::Error), 0);
}

#[test]
fn non_recursive_remove_skips_sub_packages() {
    let r = run(&app_source(), &[patch(APP_MARKER, remove(false))]);

    assert!(r.results[0].is_ok());
    assert_eq!(r.claimed(), vec![id(APP_MARKER), id("Lcom/app/A;")]);
    assert_eq!(
        r.output,
        vec![id("Lcom/app/sub/B;"), id("Lcom/other/C;")]
    );
}

#[test]
fn removal_is_logged_per_class_at_debug() {
    let r = run(&app_source(), &[patch(APP_MARKER, remove(false))]);

    assert_eq!(
        r.diagnostics.messages(Level::Debug),
        vec![
            "remove package non-recursive",
            "remove type 'com.app.package-info'",
            "remove type 'com.app.A'",
        ]
    );
}

#[test]
fn replace_emits_the_patch_marker_in_place_of_the_package() {
    let annotation = PatchAnnotation::new(Action::Replace).with_recursive(true);
    let r = run(&app_source(), &[patch(APP_MARKER, annotation)]);

    assert!(r.results[0].is_ok());
    assert_eq!(r.output, vec![id(APP_MARKER), id("Lcom/other/C;")]);
    assert_eq!(
        r.diagnostics.messages(Level::Debug)[0],
        "replace package recursive"
    );
}

#[test]
fn replaced_marker_is_emitted_without_its_directive() {
    let source: SourceSet = app_source()
        .into_iter()
        .map(|s| ClassDef::new(id(s)))
        .collect();
    let mut diagnostics = MemoryDiagnostics::new(Level::Info);
    let mut session = PatchSession::new(source, &mut diagnostics);
    let mut patcher = PackagePatcher::new(GenericPatcher::new());
    let annotation = PatchAnnotation::new(Action::Replace);
    let marker_patch = patch(APP_MARKER, annotation.clone());

    process_patch(&mut patcher, &mut session, &marker_patch, &annotation).unwrap();
    assert_eq!(session.result_for(&id(APP_MARKER)), Some(&id(APP_MARKER)));

    let (_, output) = session.finish();
    assert_eq!(output.len(), 1);
    assert!(output[0].patch.is_none());
}

#[test]
fn relative_target_names_a_sub_package() {
    let annotation = remove(true).with_target(".sub");
    let r = run(&app_source(), &[patch(APP_MARKER, annotation)]);

    assert!(r.results[0].is_ok());
    assert_eq!(r.claimed(), vec![id("Lcom/app/sub/B;")]);
    assert_eq!(
        r.output,
        vec![id(APP_MARKER), id("Lcom/app/A;"), id("Lcom/other/C;")]
    );
}

#[test]
fn explicit_target_extends_the_log_prefix() {
    let source: SourceSet = app_source()
        .into_iter()
        .map(|s| ClassDef::new(id(s)))
        .collect();
    let mut diagnostics = MemoryDiagnostics::new(Level::Debug);
    {
        let mut session = PatchSession::new(source, &mut diagnostics);
        let mut patcher = PackagePatcher::new(GenericPatcher::new());
        let annotation = remove(false).with_target("com.other");
        let p = patch(APP_MARKER, annotation.clone());
        session.begin_class(&p.ty);
        process_patch(&mut patcher, &mut session, &p, &annotation).unwrap();
    }

    let removal = diagnostics
        .entries()
        .iter()
        .find(|d| d.message == "remove type 'com.other.C'")
        .unwrap();
    assert_eq!(
        removal.prefix.as_deref(),
        Some("type 'com.app.package-info' -> 'com.other.package-info'")
    );
}

#[test]
fn target_class_is_rejected_before_any_claim() {
    let annotation = remove(true).with_target_class(id("Lcom/app/A;"));
    let r = run(&app_source(), &[patch(APP_MARKER, annotation)]);

    match &r.results[0] {
        Err(e) => assert_eq!(e.element(), Some(marker::ELEM_TARGET_CLASS)),
        Ok(()) => panic!("expected targetClass to be rejected"),
    }
    assert!(r.claimed().is_empty());
    assert_eq!(r.output.len(), 4);
}

#[test]
fn content_only_is_rejected_for_packages() {
    let annotation = PatchAnnotation::new(Action::Replace).with_content_only(true);
    let r = run(&app_source(), &[patch(APP_MARKER, annotation)]);

    match &r.results[0] {
        Err(e) => assert_eq!(e.element(), Some(marker::ELEM_CONTENT_ONLY)),
        Ok(()) => panic!("expected contentOnly to be rejected"),
    }
    assert!(r.claimed().is_empty());
}

#[test]
fn non_package_target_is_rejected() {
    let annotation = remove(true).with_target("Lcom/app/A;");
    let r = run(&app_source(), &[patch(APP_MARKER, annotation)]);

    match &r.results[0] {
        Err(e @ PatchError::InvalidTarget { .. }) => {
            assert_eq!(e.to_string(), "target is not a package")
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(r.claimed().is_empty());
}

#[test]
fn repeated_removal_is_idempotent() {
    let p = patch(APP_MARKER, remove(true));
    let r = run(&app_source(), &[p.clone(), p]);

    assert!(r.results.iter().all(|res| res.is_ok()));
    assert_eq!(r.claimed().len(), 3);
    assert_eq!(r.diagnostics.count(Level::Error), 0);
    assert_eq!(
        r.diagnostics
            .messages(Level::Debug)
            .iter()
            .filter(|m| m.starts_with("remove type"))
            .count(),
        3
    );
}

#[test]
fn conflicting_claims_are_reported_once_each_and_skipped() {
    let remove_a = patch(
        "Lcom/app/RemoveA;",
        PatchAnnotation::new(Action::Remove).with_target("Lcom/app/A;"),
    );
    let mut source = app_source();
    source.push("Lcom/app/RemoveA;");
    let r = run(&source, &[remove_a, patch(APP_MARKER, remove(true))]);

    assert!(r.results.iter().all(|res| res.is_ok()));
    assert_eq!(
        r.diagnostics.messages(Level::Error),
        vec!["already targeted type 'com.app.A'"]
    );
    assert_eq!(
        r.source.targeted_by(&id("Lcom/app/A;")),
        Some(&id("Lcom/app/RemoveA;"))
    );
    assert_eq!(
        r.source.targeted_by(&id("Lcom/app/sub/B;")),
        Some(&id(APP_MARKER))
    );
    assert_eq!(r.output, vec![id("Lcom/other/C;")]);
}

#[test]
fn generic_claim_after_package_claim_is_fatal() {
    let remove_a = patch(
        "Lcom/app/RemoveA;",
        PatchAnnotation::new(Action::Remove).with_target("Lcom/app/A;"),
    );
    let r = run(&app_source(), &[patch(APP_MARKER, remove(true)), remove_a]);

    assert!(r.results[0].is_ok());
    assert!(matches!(
        r.results[1],
        Err(PatchError::AlreadyTargeted { .. })
    ));
}

#[test]
fn look_alike_markers_go_through_the_generic_path() {
    let source = ["LFooPackage_info;", "LBar;"];
    let r = run(
        &source,
        &[patch("LFooPackage_info;", remove(false))],
    );

    assert!(r.results[0].is_ok());
    assert_eq!(r.claimed(), vec![id("LFooPackage_info;")]);
    assert_eq!(r.output, vec![id("LBar;")]);
}

#[test]
fn recursive_flag_on_a_plain_class_is_invalid() {
    let r = run(&["LBar;"], &[patch("LBar;", remove(true))]);

    match &r.results[0] {
        Err(e) => assert_eq!(e.element(), Some(marker::ELEM_RECURSIVE)),
        Ok(()) => panic!("expected recursive to be rejected"),
    }
}

#[test]
fn root_package_covers_every_class_when_recursive() {
    let mut source = app_source();
    source.push("LTop;");
    let r = run(&source, &[patch("Lpackage-info;", remove(true))]);

    assert!(r.results[0].is_ok());
    assert_eq!(r.claimed().len(), 5);
    assert!(r.output.is_empty());
}

#[test]
fn root_package_non_recursive_covers_only_top_level_classes() {
    let mut source = app_source();
    source.push("LTop;");
    let r = run(&source, &[patch("Lpackage-info;", remove(false))]);

    assert_eq!(r.claimed(), vec![id("LTop;")]);
}

#[test]
fn bare_dot_and_empty_targets_name_the_root_package() {
    for target in [".", ""] {
        let r = run(
            &["LTop;", "Lcom/app/A;"],
            &[patch(APP_MARKER, remove(false).with_target(target))],
        );

        assert!(r.results[0].is_ok(), "target {:?}", target);
        assert_eq!(r.claimed(), vec![id("LTop;")], "target {:?}", target);
        assert_eq!(r.output, vec![id("Lcom/app/A;")], "target {:?}", target);
    }
}

#[test]
fn add_of_a_new_marker_is_forwarded() {
    let r = run(
        &["Lcom/other/C;"],
        &[patch(APP_MARKER, PatchAnnotation::new(Action::Add))],
    );

    assert!(r.results[0].is_ok());
    assert_eq!(r.output, vec![id(APP_MARKER), id("Lcom/other/C;")]);
}

#[test]
fn ignore_emits_nothing() {
    let mut patcher = PackagePatcher::new(GenericPatcher::new());
    let mut diagnostics = MemoryDiagnostics::new(Level::Debug);
    let mut session = PatchSession::new(SourceSet::new(), &mut diagnostics);
    let annotation = PatchAnnotation::new(Action::Ignore);
    let p = patch(APP_MARKER, annotation.clone());

    patcher
        .on_prepare(&mut session, &p.ty, &p, &annotation)
        .unwrap();
    patcher
        .on_ignore(&mut session, &p.ty, &p, &annotation)
        .unwrap();
    assert!(patcher.is_processing_package());
    assert!(session.finish().1.is_empty());
}
