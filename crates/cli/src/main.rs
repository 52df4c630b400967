use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use sluice_core::process::SystemInvoker;
use sluice_core::registry::TaskContext;
use sluice_core::scheduler::Scheduler;
use sluice_core::types::SluiceResult;

/// Sluice - a build-task orchestrator
#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "Runs build tasks (compile, lint, format, test, version bump) in dependency order")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Task to run
    #[arg(default_value = "default")]
    task: String,

    /// List registered tasks and their prerequisites
    #[arg(long)]
    list: bool,
}

async fn run(cli: Cli) -> SluiceResult<()> {
    let registry = sluice_core::tasks::builtin()?;

    if cli.list {
        println!("{}", "Tasks".bold().underline());
        for name in registry.task_names() {
            let Some(task) = registry.get(name) else {
                continue;
            };
            if task.prerequisites.is_empty() {
                println!("{}", name.blue().bold());
            } else {
                println!(
                    "{} {}",
                    name.blue().bold(),
                    format!("[{}]", task.prerequisites.join(", ")).dimmed()
                );
            }
        }
        return Ok(());
    }

    println!("{} {}", "Running task".bold(), cli.task.cyan());

    let ctx = TaskContext::new(cli.workspace, Arc::new(SystemInvoker));
    Scheduler::new(&registry, ctx).run(&cli.task).await?;

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        "All tasks completed successfully!".green().bold()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {}", "✗".red().bold(), err.to_string().red());
        std::process::exit(err.exit_code());
    }
}
