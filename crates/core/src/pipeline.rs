//! Streaming transform pipeline
//!
//! An ordered list of stages applied to a file set. The driver collects a
//! per-item result from every stage and computes a single pass/fail verdict
//! after the drain, instead of racing a shared "errored" flag against a
//! finish observer. Intake is fail-fast: once any stage fails, no further
//! items are started, but items that already passed every stage are still
//! delivered to the caller.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::fileset::SourceFile;

/// One failed item, recorded by the driver.
#[derive(Debug, Clone)]
pub struct StageError {
    pub path: PathBuf,
    pub stage: String,
    pub message: String,
}

/// Aggregated verdict for one pipeline run.
#[derive(Debug, Default)]
pub struct StreamSummary {
    /// Items pulled from the source before intake stopped.
    pub initiated: usize,
    /// Items that passed every stage.
    pub delivered: usize,
    pub failures: Vec<StageError>,
}

impl StreamSummary {
    pub fn errored(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A single transform applied to each file in turn. Returning `Ok(None)`
/// drops the file from the stream without failing it.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self, file: SourceFile) -> Result<Option<SourceFile>, String>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Run every file through the stages. Returns the surviving files in
    /// order plus the summary the caller reduces to a task outcome.
    pub async fn drain(&self, files: Vec<SourceFile>) -> (Vec<SourceFile>, StreamSummary) {
        let mut delivered = Vec::new();
        let mut summary = StreamSummary::default();

        'intake: for file in files {
            summary.initiated += 1;
            let mut current = file;

            for stage in &self.stages {
                let path = current.path.clone();
                match stage.apply(current).await {
                    Ok(Some(next)) => current = next,
                    Ok(None) => continue 'intake,
                    Err(message) => {
                        summary.failures.push(StageError {
                            path,
                            stage: stage.name().to_string(),
                            message,
                        });
                        // Fail-fast intake: stop pulling new items.
                        break 'intake;
                    }
                }
            }

            summary.delivered += 1;
            delivered.push(current);
        }

        (delivered, summary)
    }
}
