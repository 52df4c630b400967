//! Version bump and tag tasks
//!
//! Both depend on the default aggregate completing first; the scheduler
//! enforces that. The bump rewrites the version in both manifests and makes
//! exactly one commit with the fixed message. The tag task derives a
//! `v`-prefixed tag from the manifest version.

use async_trait::async_trait;
use colored::*;

use crate::manifest::{BumpKind, Manifest};
use crate::outcome::TaskOutcome;
use crate::process::Invocation;
use crate::registry::{TaskBody, TaskContext};
use crate::types::{SluiceError, SluiceResult};

const VCS: &str = "git";
const MANIFEST_FILES: [&str; 2] = ["package.json", "package-lock.json"];
const COMMIT_MESSAGE: &str = "bump version";
const TAG_PREFIX: &str = "v";

async fn run_vcs(ctx: &TaskContext, args: Vec<String>) -> SluiceResult<()> {
    let invocation = Invocation::capture(VCS, args).current_dir(&ctx.root);
    let result = ctx.invoker.invoke(&invocation).await?;
    if !result.success() {
        if !result.stderr.trim().is_empty() {
            eprintln!("{}", result.stderr.trim_end());
        }
        return Err(SluiceError::Process {
            program: result.program,
            code: result.exit_code,
        });
    }
    Ok(())
}

pub struct BumpTask {
    kind: BumpKind,
}

impl BumpTask {
    pub fn new(kind: BumpKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl TaskBody for BumpTask {
    async fn run(&self, ctx: &TaskContext) -> SluiceResult<TaskOutcome> {
        let mut manifests = Vec::new();
        for file in MANIFEST_FILES {
            manifests.push(Manifest::load(&ctx.root.join(file))?);
        }

        // The first manifest is the version of record; the lock file follows.
        let current = manifests[0].version()?;
        let next = current.bump(self.kind);
        for manifest in &mut manifests {
            manifest.set_version(&next)?;
            manifest.save()?;
        }
        println!(
            "{}",
            format!("Version {current} -> {next}").bold()
        );

        let mut args = vec!["commit".to_string(), "-m".to_string(), COMMIT_MESSAGE.to_string()];
        args.extend(MANIFEST_FILES.into_iter().map(String::from));
        run_vcs(ctx, args).await?;

        Ok(TaskOutcome::Completed)
    }
}

pub struct TagTask;

#[async_trait]
impl TaskBody for TagTask {
    async fn run(&self, ctx: &TaskContext) -> SluiceResult<TaskOutcome> {
        let manifest = Manifest::load(&ctx.root.join(MANIFEST_FILES[0]))?;
        let tag = format!("{}{}", TAG_PREFIX, manifest.version()?);

        run_vcs(ctx, vec!["tag".to_string(), tag.clone()]).await?;
        println!("{}", format!("Created tag {tag}").bold());

        Ok(TaskOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;
    use crate::process::testing::{exits, FakeInvoker};
    use crate::process::Invoker;

    fn workspace(version: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in MANIFEST_FILES {
            fs::write(
                dir.path().join(file),
                format!(r#"{{"name": "demo", "version": "{version}"}}"#),
            )
            .unwrap();
        }
        dir
    }

    fn version_in(dir: &tempfile::TempDir, file: &str) -> String {
        Manifest::load(&dir.path().join(file))
            .unwrap()
            .version()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn minor_bump_rewrites_both_manifests_with_one_commit() {
        let dir = workspace("1.2.3");
        let invoker = Arc::new(FakeInvoker::new(vec![exits(VCS, 0)]));
        let invoker_dyn: Arc<dyn Invoker> = invoker.clone();
        let ctx = TaskContext::new(dir.path(), invoker_dyn);

        BumpTask::new(BumpKind::Minor).run(&ctx).await.unwrap();

        assert_eq!(version_in(&dir, "package.json"), "1.3.0");
        assert_eq!(version_in(&dir, "package-lock.json"), "1.3.0");

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, VCS);
        let head: Vec<&str> = calls[0].args[..3].iter().map(String::as_str).collect();
        assert_eq!(head, vec!["commit", "-m", COMMIT_MESSAGE]);
        assert!(calls[0].args.contains(&"package.json".to_string()));
        assert!(calls[0].args.contains(&"package-lock.json".to_string()));
    }

    #[tokio::test]
    async fn commit_failure_propagates() {
        let dir = workspace("1.2.3");
        let invoker = Arc::new(FakeInvoker::new(vec![exits(VCS, 1)]));
        let ctx = TaskContext::new(dir.path(), invoker);

        let err = BumpTask::new(BumpKind::Patch).run(&ctx).await.unwrap_err();
        assert!(matches!(err, SluiceError::Process { .. }));
    }

    #[tokio::test]
    async fn tag_uses_the_manifest_version() {
        let dir = workspace("1.3.0");
        let invoker = Arc::new(FakeInvoker::new(vec![exits(VCS, 0)]));
        let invoker_dyn: Arc<dyn Invoker> = invoker.clone();
        let ctx = TaskContext::new(dir.path(), invoker_dyn);

        TagTask.run(&ctx).await.unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["tag", "v1.3.0"]);
    }
}
