//! Compile task
//!
//! Pipeline over the project's source files: source-map tracking begins,
//! each file is handed to the external compiler with captured output, and
//! surviving output is written to the configured output directory together
//! with its source map. Any compile failure reduces to exit code 1 after
//! the drain, even though already compiled files were written.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use colored::*;

use crate::config::ProjectConfig;
use crate::fileset::{select_files, SourceFile};
use crate::outcome::TaskOutcome;
use crate::pipeline::{Pipeline, Stage};
use crate::process::{Invocation, Invoker};
use crate::registry::{TaskBody, TaskContext};
use crate::types::SluiceResult;

const COMPILER: &str = "tsc";
const PROJECT_FILE: &str = "tsconfig.json";

/// Marks where source-map tracking begins: everything downstream maps back
/// to the path recorded here.
struct SourceMapInit;

#[async_trait]
impl Stage for SourceMapInit {
    fn name(&self) -> &str {
        "sourcemap-init"
    }

    async fn apply(&self, mut file: SourceFile) -> Result<Option<SourceFile>, String> {
        file.origin = Some(file.path.clone());
        Ok(Some(file))
    }
}

/// Runs the external compiler on one file, treating its stdout as the
/// compiled output. A non-zero exit fails the item with the compiler's
/// diagnostics as the message.
struct CompileStage {
    invoker: Arc<dyn Invoker>,
    root: PathBuf,
    flags: Vec<String>,
}

impl CompileStage {
    fn new(ctx: &TaskContext, config: &ProjectConfig) -> Self {
        let mut flags = Vec::new();
        if config.no_emit_on_error() {
            flags.push("--noEmitOnError".to_string());
        }
        if config.source_map() {
            flags.push("--sourceMap".to_string());
        }
        Self {
            invoker: Arc::clone(&ctx.invoker),
            root: ctx.root.clone(),
            flags,
        }
    }
}

#[async_trait]
impl Stage for CompileStage {
    fn name(&self) -> &str {
        "compile"
    }

    async fn apply(&self, mut file: SourceFile) -> Result<Option<SourceFile>, String> {
        let mut args = self.flags.clone();
        args.push(file.path.to_string_lossy().into_owned());
        let invocation = Invocation::capture(COMPILER, args).current_dir(&self.root);

        let result = self
            .invoker
            .invoke(&invocation)
            .await
            .map_err(|e| e.to_string())?;

        if !result.success() {
            let diagnostics = if result.stderr.trim().is_empty() {
                result.stdout
            } else {
                result.stderr
            };
            return Err(diagnostics.trim().to_string());
        }

        file.path = file.path.with_extension("js");
        file.contents = result.stdout;
        Ok(Some(file))
    }
}

/// Relative path from `base_dir` to `target`, both relative to the same
/// root. Used for the `sources` entries of emitted maps.
fn relative_from(target: &Path, base_dir: &Path) -> PathBuf {
    let mut target_parts = target.components().peekable();
    let mut base_parts = base_dir.components().peekable();

    while let (Some(t), Some(b)) = (target_parts.peek(), base_parts.peek()) {
        if t == b {
            target_parts.next();
            base_parts.next();
        } else {
            break;
        }
    }

    let mut relative = PathBuf::new();
    for _ in base_parts {
        relative.push("..");
    }
    for part in target_parts {
        relative.push(part);
    }
    relative
}

fn source_map_for(file: &SourceFile, out_dir: &Path) -> Option<serde_json::Value> {
    let origin = file.origin.as_ref()?;
    let map_dir = out_dir.join(file.path.parent().unwrap_or_else(|| Path::new("")));
    let source = relative_from(origin, &map_dir);
    let file_name = file.path.file_name()?.to_string_lossy().into_owned();
    // Original content is intentionally omitted from the map; the sources
    // are assumed locally available.
    Some(serde_json::json!({
        "version": 3,
        "file": file_name,
        "sourceRoot": "",
        "sources": [source.to_string_lossy()],
        "names": [],
        "mappings": "",
    }))
}

fn write_outputs(
    root: &Path,
    out_dir: &str,
    files: &[SourceFile],
    source_map: bool,
) -> SluiceResult<()> {
    let out_root = Path::new(out_dir);
    for file in files {
        let destination = root.join(out_root.join(&file.path));
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&destination, &file.contents)?;

        if source_map {
            if let Some(map) = source_map_for(file, out_root) {
                let map_path = destination.with_extension("js.map");
                fs::write(map_path, serde_json::to_string(&map)?)?;
            }
        }
    }
    Ok(())
}

pub struct CompileTask;

#[async_trait]
impl TaskBody for CompileTask {
    async fn run(&self, ctx: &TaskContext) -> SluiceResult<TaskOutcome> {
        let config = ProjectConfig::load(&ctx.root.join(PROJECT_FILE))?;
        let files = select_files(&ctx.root, &config.include_globs(), &config.exclude_globs())?;
        println!("{}", format!("Compiling {} file(s)", files.len()).dimmed());

        let pipeline = Pipeline::new(vec![
            Box::new(SourceMapInit),
            Box::new(CompileStage::new(ctx, &config)),
        ]);
        let (compiled, summary) = pipeline.drain(files).await;

        for failure in &summary.failures {
            eprintln!(
                "{} {}: {}",
                "✗".red().bold(),
                failure.path.display(),
                failure.message
            );
        }

        write_outputs(&ctx.root, &config.out_dir(), &compiled, config.source_map())?;
        Ok(TaskOutcome::Stream(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::reduce;
    use crate::process::testing::{exits, prints, FakeInvoker};
    use crate::process::ProcessResult;

    #[test]
    fn relative_path_walks_up_from_the_map_dir() {
        assert_eq!(
            relative_from(Path::new("src/a.ts"), Path::new("out/src")),
            PathBuf::from("../../src/a.ts")
        );
        assert_eq!(
            relative_from(Path::new("a.ts"), Path::new("out")),
            PathBuf::from("../a.ts")
        );
    }

    fn workspace_with_source() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"compilerOptions": {"outDir": "out"}, "include": ["src/**/*.ts"]}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.ts"), "let a: number = 1;").unwrap();
        dir
    }

    fn ctx(dir: &tempfile::TempDir, invoker: Arc<FakeInvoker>) -> TaskContext {
        TaskContext::new(dir.path(), invoker)
    }

    #[tokio::test]
    async fn writes_compiled_output_and_source_map() {
        let dir = workspace_with_source();
        let invoker = Arc::new(FakeInvoker::new(vec![prints(COMPILER, "var a = 1;\n")]));

        let outcome = CompileTask.run(&ctx(&dir, Arc::clone(&invoker))).await.unwrap();
        assert!(reduce(outcome).is_ok());

        let out = fs::read_to_string(dir.path().join("out/src/a.js")).unwrap();
        assert_eq!(out, "var a = 1;\n");

        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("out/src/a.js.map")).unwrap())
                .unwrap();
        assert_eq!(map["file"], "a.js");
        assert_eq!(map["sources"][0], "../../src/a.ts");
        assert!(map.get("sourcesContent").is_none());

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args.contains(&"--noEmitOnError".to_string()));
        assert!(calls[0].args.contains(&"src/a.ts".to_string()));
    }

    #[tokio::test]
    async fn compile_failure_reduces_to_exit_code_one() {
        let dir = workspace_with_source();
        let failure = ProcessResult {
            stderr: "src/a.ts(1,5): error TS2322".to_string(),
            ..exits(COMPILER, 2)
        };
        let invoker = Arc::new(FakeInvoker::new(vec![failure]));

        let outcome = CompileTask.run(&ctx(&dir, invoker)).await.unwrap();
        let err = reduce(outcome).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(!dir.path().join("out/src/a.js").exists());
    }
}
