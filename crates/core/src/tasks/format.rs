//! Format task
//!
//! Two variants differing only in how the candidate file list is produced:
//! files changed since the last committed revision, or every file tracked
//! by version control. Candidates are filtered to recognized source
//! extensions; an empty set completes without invoking the formatter. The
//! formatter is called with a discrete argument list, never a concatenated
//! shell string.

use async_trait::async_trait;

use crate::outcome::TaskOutcome;
use crate::process::{Invocation, ProcessResult};
use crate::registry::{TaskBody, TaskContext};
use crate::types::{SluiceError, SluiceResult};

const VCS: &str = "git";
const FORMATTER: &str = "prettier";

/// Where the candidate file list comes from.
#[derive(Debug, Clone, Copy)]
pub enum FileListSource {
    /// Working tree diff against HEAD.
    Changed,
    /// Every file tracked by version control.
    Tracked,
}

impl FileListSource {
    fn invocation(self) -> Invocation {
        let args = match self {
            FileListSource::Changed => vec!["diff", "--name-only", "HEAD"],
            FileListSource::Tracked => vec!["ls-files"],
        };
        Invocation::capture(VCS, args.into_iter().map(String::from).collect())
    }
}

/// Keep only paths with a recognized source extension, in input order.
fn filter_source_files(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| line.ends_with(".ts") || line.ends_with(".js"))
        .map(String::from)
        .collect()
}

fn check(result: ProcessResult) -> SluiceResult<ProcessResult> {
    if result.success() {
        Ok(result)
    } else {
        Err(SluiceError::Process {
            program: result.program,
            code: result.exit_code,
        })
    }
}

pub struct FormatTask {
    source: FileListSource,
}

impl FormatTask {
    pub fn new(source: FileListSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl TaskBody for FormatTask {
    async fn run(&self, ctx: &TaskContext) -> SluiceResult<TaskOutcome> {
        let listing = check(
            ctx.invoker
                .invoke(&self.source.invocation().current_dir(&ctx.root))
                .await?,
        )?;

        let files = filter_source_files(&listing.stdout);
        if files.is_empty() {
            return Ok(TaskOutcome::Completed);
        }

        let mut args: Vec<String> = [
            "--write",
            "--print-width",
            "100",
            "--single-quote",
            "--trailing-comma",
            "es5",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        args.extend(files);

        check(
            ctx.invoker
                .invoke(&Invocation::capture(FORMATTER, args).current_dir(&ctx.root))
                .await?,
        )?;
        Ok(TaskOutcome::Completed)
    }
}
