//! Task scheduler
//!
//! Resolves a task's listed prerequisites through the same scheduling path,
//! then runs the task's own body. Resolution is strictly sequential; the
//! external tools this orchestrator drives (git in particular) are not safe
//! to run concurrently. A failed prerequisite blocks the dependent body
//! entirely.

use colored::*;
use futures::future::BoxFuture;

use crate::outcome::reduce;
use crate::registry::{Registry, TaskContext};
use crate::types::{SluiceError, SluiceResult};

pub struct Scheduler<'a> {
    registry: &'a Registry,
    ctx: TaskContext,
}

impl<'a> Scheduler<'a> {
    pub fn new(registry: &'a Registry, ctx: TaskContext) -> Self {
        Self { registry, ctx }
    }

    /// Run a task by name: prerequisites first, body last. The result is the
    /// reduced outcome of the whole subtree.
    pub async fn run(&self, task_name: &str) -> SluiceResult<()> {
        self.run_inner(task_name).await
    }

    fn run_inner<'s>(&'s self, task_name: &'s str) -> BoxFuture<'s, SluiceResult<()>> {
        Box::pin(async move {
            let task = self.registry.get(task_name).ok_or_else(|| {
                SluiceError::Task(format!(
                    "Task '{}' not found. Available tasks: {}",
                    task_name,
                    self.registry.task_names().join(", ")
                ))
            })?;

            for prerequisite in &task.prerequisites {
                self.run_inner(prerequisite).await?;
            }

            if let Some(body) = &task.body {
                println!();
                println!(
                    "┌─ {}",
                    format!("Running task '{}'", task.name).bold()
                );
                let outcome = body.run(&self.ctx).await?;
                reduce(outcome)?;
                println!(
                    "{} {}",
                    "✓".green().bold(),
                    format!("Completed '{}'", task.name).green()
                );
            }

            Ok(())
        })
    }
}
