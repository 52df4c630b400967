//! Result reduction
//!
//! Tasks finish in heterogeneous ways: a drained stream, an external process
//! exit, or a plain completion. The reducer normalizes all of them into the
//! single success/failure value the scheduler composes.

use crate::pipeline::StreamSummary;
use crate::process::ProcessResult;
use crate::types::{SluiceError, SluiceResult};

/// How a task body finished.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The body ran to completion with nothing further to inspect.
    Completed,
    /// A stream pipeline drained; the summary decides pass or fail.
    Stream(StreamSummary),
    /// An external process terminated the task; its code decides pass or
    /// fail and is propagated verbatim on failure.
    Process(ProcessResult),
}

/// Reduce a task outcome to the uniform result the scheduler consumes.
pub fn reduce(outcome: TaskOutcome) -> SluiceResult<()> {
    match outcome {
        TaskOutcome::Completed => Ok(()),
        TaskOutcome::Stream(summary) => {
            if summary.errored() {
                Err(SluiceError::Pipeline {
                    failures: summary.failures.len(),
                })
            } else {
                Ok(())
            }
        }
        TaskOutcome::Process(result) => {
            if result.success() {
                Ok(())
            } else {
                Err(SluiceError::Process {
                    program: result.program,
                    code: result.exit_code,
                })
            }
        }
    }
}
