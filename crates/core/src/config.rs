//! Project configuration
//!
//! Parses the compiler project file (`tsconfig.json`): the source globs and
//! the handful of compiler options the orchestrator cares about.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::SluiceResult;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub out_dir: Option<String>,
    pub source_map: Option<bool>,
    pub no_emit_on_error: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> SluiceResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ProjectConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn include_globs(&self) -> Vec<String> {
        self.include
            .clone()
            .unwrap_or_else(|| vec!["**/*.ts".to_string()])
    }

    pub fn exclude_globs(&self) -> Vec<String> {
        let mut excludes = self.exclude.clone().unwrap_or_default();
        for default in ["node_modules/**", "typings/**"] {
            if !excludes.iter().any(|e| e == default) {
                excludes.push(default.to_string());
            }
        }
        // Never re-read our own output.
        let out = format!("{}/**", self.out_dir());
        if !excludes.contains(&out) {
            excludes.push(out);
        }
        excludes
    }

    pub fn out_dir(&self) -> String {
        self.compiler_options
            .out_dir
            .clone()
            .unwrap_or_else(|| "out".to_string())
    }

    pub fn source_map(&self) -> bool {
        self.compiler_options.source_map.unwrap_or(true)
    }

    pub fn no_emit_on_error(&self) -> bool {
        self.compiler_options.no_emit_on_error.unwrap_or(true)
    }
}
