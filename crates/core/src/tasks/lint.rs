//! Lint task
//!
//! Runs the static analyzer over every source file (dependency and
//! type-declaration directories excluded) in prose format and prints the
//! report with a summarized failing-file count. Reporting-only: findings
//! never escalate to a task failure.

use std::collections::HashSet;

use async_trait::async_trait;
use colored::*;

use crate::fileset::select_paths;
use crate::outcome::TaskOutcome;
use crate::process::Invocation;
use crate::registry::{TaskBody, TaskContext};
use crate::types::SluiceResult;

const LINTER: &str = "tslint";
const PROJECT_FILE: &str = "tsconfig.json";

/// Count distinct files named in a prose-format report. Lines look like
/// `ERROR: src/mode.ts[12, 5]: missing semicolon`.
fn count_failing_files(report: &str) -> usize {
    let mut files = HashSet::new();
    for line in report.lines() {
        let line = line
            .trim()
            .trim_start_matches("ERROR: ")
            .trim_start_matches("WARNING: ");
        if let Some(bracket) = line.find('[') {
            if line[bracket..].contains("]:") {
                files.insert(line[..bracket].to_string());
            }
        }
    }
    files.len()
}

pub struct LintTask;

#[async_trait]
impl TaskBody for LintTask {
    async fn run(&self, ctx: &TaskContext) -> SluiceResult<TaskOutcome> {
        // Paths only; the analyzer reads the files itself.
        let files = select_paths(
            &ctx.root,
            &["**/*.ts".to_string()],
            &["node_modules/**".to_string(), "typings/**".to_string()],
        )?;

        let mut args = vec![
            "--format".to_string(),
            "prose".to_string(),
            "--project".to_string(),
            PROJECT_FILE.to_string(),
        ];
        args.extend(files.iter().map(|p| p.to_string_lossy().into_owned()));

        let invocation = Invocation::capture(LINTER, args).current_dir(&ctx.root);
        let result = ctx.invoker.invoke(&invocation).await?;

        if !result.stdout.trim().is_empty() {
            println!("{}", result.stdout.trim_end());
        }
        if !result.stderr.trim().is_empty() {
            eprintln!("{}", result.stderr.trim_end());
        }

        let failing = count_failing_files(&result.stdout);
        if failing > 0 {
            println!("{}", format!("{failing} file(s) with lint failures").yellow());
        }

        // The linter's findings (and exit code) are advisory only.
        Ok(TaskOutcome::Completed)
    }
}
