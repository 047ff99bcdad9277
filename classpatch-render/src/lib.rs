//! Rendering helpers (markdown) for human-readable artifacts.

use classpatch_types::report::{Level, MergeReport, PatchOutcome};

pub fn render_report_md(report: &MergeReport) -> String {
    let mut out = String::new();
    out.push_str("# classpatch merge\n\n");
    out.push_str(&format!(
        "- Classes: {} source, {} patch, {} output\n",
        report.counts.source_classes, report.counts.patch_classes, report.counts.output_classes
    ));
    out.push_str(&format!("- Targeted: {}\n", report.counts.targeted));
    out.push_str(&format!(
        "- Errors: {}\n- Warnings: {}\n",
        report.counts.errors, report.counts.warnings
    ));
    for input in &report.inputs {
        out.push_str(&format!(
            "- {} `{}` ({} classes, sha256 `{}`)\n",
            input.role,
            input.path,
            input.classes,
            input.sha256.as_deref().unwrap_or("-")
        ));
    }
    out.push('\n');

    out.push_str("## Patches\n\n");
    if report.outcomes.is_empty() {
        out.push_str("_No patch classes._\n");
    } else {
        out.push_str("| Patch | Action | Result |\n|---|---|---|\n");
        for o in &report.outcomes {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                o.patch.label(),
                o.action,
                result_label(o)
            ));
        }
    }

    let problems: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.level >= Level::Warn)
        .collect();
    if !problems.is_empty() {
        out.push_str("\n## Diagnostics\n\n");
        for d in problems {
            out.push_str(&format!("- {}\n", d));
        }
    }

    out
}

fn result_label(o: &PatchOutcome) -> String {
    if o.failed {
        return "failed".to_string();
    }
    match &o.result {
        Some(id) if *id == o.patch => "emitted".to_string(),
        Some(id) => format!("emitted as `{}`", id.label()),
        None => "-".to_string(),
    }
}
