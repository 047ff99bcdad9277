//! Action explanations for the `classpatch explain` command.

use classpatch_types::annotation::Action;
use classpatch_types::marker;

/// Information about one patch action.
#[derive(Debug, Clone)]
pub struct ActionExplanation {
    pub action: Action,
    /// Human-readable title.
    pub title: &'static str,
    /// What the action does to an ordinary class.
    pub description: &'static str,
    /// What the action does when the patch class is a package marker, if it has package
    /// semantics of its own.
    pub package_semantics: Option<&'static str>,
    /// Directive elements the action accepts.
    pub elements: &'static [&'static str],
}

/// Registry of all action explanations.
pub static ACTION_REGISTRY: &[ActionExplanation] = &[
    ActionExplanation {
        action: Action::Add,
        title: "Add",
        description: r#"Copies the patch class into the output unchanged, minus its directive.

Fails if the source set already holds a class with the same identifier. This is
the default action for patch classes without a directive, unless
`[merge].default_action` says otherwise."#,
        package_semantics: None,
        elements: &[],
    },
    ActionExplanation {
        action: Action::Edit,
        title: "Edit",
        description: r#"Merges the patch class into its target.

Members are matched by name and descriptor; a patch member replaces the original
one with the same signature and new members are appended. With `contentOnly`,
the class-level attributes of the original are kept."#,
        package_semantics: None,
        elements: &[
            marker::ELEM_TARGET,
            marker::ELEM_TARGET_CLASS,
            marker::ELEM_CONTENT_ONLY,
        ],
    },
    ActionExplanation {
        action: Action::Replace,
        title: "Replace",
        description: r#"The patch class takes the place of its target, under the target's name.

With `contentOnly`, the class-level attributes of the original are kept."#,
        package_semantics: Some(
            r#"On a package marker (`<package>/package-info`), every source class in the
package is dropped and the patch marker is emitted in place of the original
one. With `recursive`, sub-packages are dropped too. `target` may name another
package as a dotted name (a leading `.` is relative to the patch's package,
and `.` alone is the root package) or as a marker descriptor."#,
        ),
        elements: &[
            marker::ELEM_TARGET,
            marker::ELEM_TARGET_CLASS,
            marker::ELEM_RECURSIVE,
            marker::ELEM_CONTENT_ONLY,
        ],
    },
    ActionExplanation {
        action: Action::Remove,
        title: "Remove",
        description: r#"Drops the target from the output. The patch class itself is not emitted."#,
        package_semantics: Some(
            r#"On a package marker, every source class in the package is dropped, including
the original marker. With `recursive`, sub-packages are dropped too. A class
already claimed by an earlier patch is reported as an error and left to that
patch; the rest of the package is still removed."#,
        ),
        elements: &[
            marker::ELEM_TARGET,
            marker::ELEM_TARGET_CLASS,
            marker::ELEM_RECURSIVE,
        ],
    },
    ActionExplanation {
        action: Action::Ignore,
        title: "Ignore",
        description: r#"Skips the patch class. Classes in the annotation package are ignored this
way automatically unless auto-ignore is turned off."#,
        package_semantics: None,
        elements: &[],
    },
];

/// Look up an action by name, case-insensitively.
pub fn lookup_action(query: &str) -> Option<&'static ActionExplanation> {
    let action: Action = query.parse().ok()?;
    ACTION_REGISTRY.iter().find(|a| a.action == action)
}

/// List all action names.
pub fn list_action_names() -> Vec<&'static str> {
    ACTION_REGISTRY.iter().map(|a| a.action.name()).collect()
}
