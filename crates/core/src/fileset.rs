//! File selection by glob patterns
//!
//! Builds the ordered set of source files a task operates on, matched by
//! include/exclude globs relative to the workspace root.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::types::SluiceResult;

/// A file flowing through a pipeline. `path` is relative to the workspace
/// root; `origin` is set once source-map tracking begins and survives
/// transforms that rewrite `path`.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
    pub origin: Option<PathBuf>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            origin: None,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> SluiceResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Select file paths under `root` matching the include globs and not
/// matching the exclude globs, without reading contents. An empty include
/// list matches everything. Results are sorted so runs are deterministic.
pub fn select_paths(
    root: &Path,
    include_globs: &[String],
    exclude_globs: &[String],
) -> SluiceResult<Vec<PathBuf>> {
    let include_set = build_glob_set(include_globs)?;
    let exclude_set = build_glob_set(exclude_globs)?;

    let mut selected = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current_dir) = queue.pop_front() {
        if let Ok(entries) = fs::read_dir(&current_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                let relative_path = path.strip_prefix(root).unwrap_or(&path);

                if exclude_set.is_match(relative_path) {
                    continue;
                }

                if path.is_dir() {
                    queue.push_back(path);
                } else if include_globs.is_empty() || include_set.is_match(relative_path) {
                    selected.push(relative_path.to_path_buf());
                }
            }
        }
    }

    selected.sort();
    Ok(selected)
}

/// Like [`select_paths`], but reads every selected file's contents so the
/// result can flow through a pipeline.
pub fn select_files(
    root: &Path,
    include_globs: &[String],
    exclude_globs: &[String],
) -> SluiceResult<Vec<SourceFile>> {
    let mut selected = Vec::new();
    for path in select_paths(root, include_globs, exclude_globs)? {
        let contents = fs::read_to_string(root.join(&path))?;
        selected.push(SourceFile::new(path, contents));
    }
    Ok(selected)
}
