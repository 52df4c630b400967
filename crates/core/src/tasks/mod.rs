//! Built-in tasks
//!
//! One module per task plus the registry constructor. Task names are the
//! CLI surface: `compile`, `tslint`, `prettier`, `forceprettier`, `test`,
//! `tag`, `patch`, `minor`, `major`, `default`.

pub mod compile;
pub mod format;
pub mod lint;
pub mod version;

use crate::manifest::BumpKind;
use crate::registry::{Registry, Task};
use crate::types::SluiceResult;

use compile::CompileTask;
use format::{FileListSource, FormatTask};
use lint::LintTask;
use test::TestTask;
use version::{BumpTask, TagTask};

/// Construct the full registry of built-in tasks. Called once at startup;
/// the registry is read-only afterwards.
pub fn builtin() -> SluiceResult<Registry> {
    Registry::new(vec![
        Task::new("compile", vec![], CompileTask),
        Task::new("tslint", vec![], LintTask),
        Task::new("prettier", vec![], FormatTask::new(FileListSource::Changed)),
        Task::new(
            "forceprettier",
            vec![],
            FormatTask::new(FileListSource::Tracked),
        ),
        Task::new("test", vec![], TestTask),
        Task::aggregate("default", vec!["prettier", "tslint", "compile"]),
        Task::new("patch", vec!["default"], BumpTask::new(BumpKind::Patch)),
        Task::new("minor", vec!["default"], BumpTask::new(BumpKind::Minor)),
        Task::new("major", vec!["default"], BumpTask::new(BumpKind::Major)),
        Task::new("tag", vec!["default"], TagTask),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_the_full_task_surface() {
        let registry = builtin().unwrap();
        assert_eq!(
            registry.task_names(),
            vec![
                "compile",
                "default",
                "forceprettier",
                "major",
                "minor",
                "patch",
                "prettier",
                "tag",
                "test",
                "tslint",
            ]
        );
    }

    #[test]
    fn default_aggregates_format_lint_and_compile() {
        let registry = builtin().unwrap();
        let default = registry.get("default").unwrap();
        assert!(default.body.is_none());
        assert_eq!(default.prerequisites, vec!["prettier", "tslint", "compile"]);
    }

    #[test]
    fn bump_and_tag_depend_on_default() {
        let registry = builtin().unwrap();
        for name in ["patch", "minor", "major", "tag"] {
            assert_eq!(registry.get(name).unwrap().prerequisites, vec!["default"]);
        }
    }
}
