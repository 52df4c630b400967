//! Sluice Core Library
//!
//! Core engine for the Sluice build-task orchestrator. It provides the task
//! registry, the scheduler that resolves prerequisites, the streaming file
//! pipeline, and the process invoker that drives external collaborator
//! tools (compiler, linter, formatter, VCS client, container runtime).
//!
//! ## Architecture
//!
//! - [`registry`] - immutable task registry built once at startup
//! - [`scheduler`] - sequential prerequisite resolution and body execution
//! - [`pipeline`] - streaming transform stages over a file set
//! - [`process`] - external command invocation with typed results
//! - [`outcome`] - reduction of heterogeneous task outcomes to pass/fail
//! - [`tasks`] - the built-in tasks and registry constructor
//! - [`fileset`] - glob-based source file selection
//! - [`config`] - compiler project configuration
//! - [`manifest`] - manifest version reading, bumping and rewriting
//! - [`types`] - common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sluice_core::process::SystemInvoker;
//! use sluice_core::registry::TaskContext;
//! use sluice_core::scheduler::Scheduler;
//!
//! # async fn example() -> sluice_core::types::SluiceResult<()> {
//! let registry = sluice_core::tasks::builtin()?;
//! let ctx = TaskContext::new(".", Arc::new(SystemInvoker));
//! Scheduler::new(&registry, ctx).run("default").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fileset;
pub mod manifest;
pub mod outcome;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod scheduler;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use registry::{Registry, Task, TaskContext};
pub use scheduler::Scheduler;
pub use types::{SluiceError, SluiceResult};
