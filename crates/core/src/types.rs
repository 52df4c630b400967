use thiserror::Error;

/// The main error type for Sluice operations
#[derive(Debug, Error)]
pub enum SluiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{program}' failed with exit code {code}")]
    Process { program: String, code: i32 },

    #[error("Pipeline reported {failures} failed file(s)")]
    Pipeline { failures: usize },

    #[error("Task error: {0}")]
    Task(String),

    #[error("Version error: {0}")]
    Version(String),
}

impl SluiceError {
    /// Exit code the process should terminate with when this error reaches
    /// the top of the run. Compile/pipeline failures force 1; external
    /// command failures propagate the child's code verbatim.
    pub fn exit_code(&self) -> i32 {
        match self {
            SluiceError::Process { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Result type alias for Sluice operations
pub type SluiceResult<T> = Result<T, SluiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_error_propagates_child_code() {
        let err = SluiceError::Process {
            program: "docker".to_string(),
            code: 42,
        };
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn pipeline_error_exits_with_one() {
        let err = SluiceError::Pipeline { failures: 3 };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn generic_errors_exit_with_one() {
        assert_eq!(SluiceError::Task("nope".to_string()).exit_code(), 1);
        let err = SluiceError::Version("bad manifest".to_string());
        assert_eq!(err.exit_code(), 1);
    }
}
