//! External process invocation
//!
//! This module provides a unified interface for running collaborator tools
//! (compiler, linter, formatter, VCS client, container runtime) and observing
//! their exit codes and output streams.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;

use crate::types::{SluiceError, SluiceResult};

/// How the child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    /// Streams go straight to the console (long-running tools, container runs).
    Inherit,
    /// Streams are collected into the [`ProcessResult`] buffers.
    Capture,
}

/// A single external command to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub io: IoMode,
}

impl Invocation {
    pub fn capture(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            io: IoMode::Capture,
        }
    }

    pub fn inherit(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            io: IoMode::Inherit,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Outcome of a completed external command. A non-zero exit code is a value
/// for the caller to inspect, not an error.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub program: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam between tasks and the operating system. Tasks never spawn commands
/// directly; they go through an `Invoker` so tests can substitute a
/// recording fake.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Run the command to completion. Returns `Ok` with the child's exit
    /// code and captured streams, or [`SluiceError::Spawn`] when the command
    /// could not be started at all.
    async fn invoke(&self, invocation: &Invocation) -> SluiceResult<ProcessResult>;
}

/// Production invoker backed by `tokio::process`.
pub struct SystemInvoker;

#[async_trait]
impl Invoker for SystemInvoker {
    async fn invoke(&self, invocation: &Invocation) -> SluiceResult<ProcessResult> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let spawn_err = |e: std::io::Error| SluiceError::Spawn {
            program: invocation.program.clone(),
            source: e,
        };

        match invocation.io {
            IoMode::Capture => {
                let output = command
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(spawn_err)?;
                Ok(ProcessResult {
                    program: invocation.program.clone(),
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            IoMode::Inherit => {
                let status = command.status().await.map_err(spawn_err)?;
                Ok(ProcessResult {
                    program: invocation.program.clone(),
                    exit_code: status.code().unwrap_or(-1),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording fake invoker shared by task tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    pub(crate) struct FakeInvoker {
        calls: Mutex<Vec<Invocation>>,
        responses: Mutex<VecDeque<ProcessResult>>,
    }

    impl FakeInvoker {
        pub(crate) fn new(responses: Vec<ProcessResult>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Invoker for FakeInvoker {
        async fn invoke(&self, invocation: &Invocation) -> SluiceResult<ProcessResult> {
            self.calls.lock().unwrap().push(invocation.clone());
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected invocation: {}", invocation.program));
            Ok(response)
        }
    }

    pub(crate) fn exits(program: &str, exit_code: i32) -> ProcessResult {
        ProcessResult {
            program: program.to_string(),
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub(crate) fn prints(program: &str, stdout: &str) -> ProcessResult {
        ProcessResult {
            program: program.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}
