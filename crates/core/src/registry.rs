//! Task registry
//!
//! The registry is built once at startup from the full set of tasks and is
//! read-only afterwards; the scheduler borrows it for the whole run. There
//! is no dynamic registration and no global task graph.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use crate::outcome::TaskOutcome;
use crate::process::Invoker;
use crate::types::{SluiceError, SluiceResult};

/// Shared state handed to every task body: the workspace root and the seam
/// through which external tools are run.
pub struct TaskContext {
    pub root: PathBuf,
    pub invoker: Arc<dyn Invoker>,
}

impl TaskContext {
    pub fn new(root: impl Into<PathBuf>, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            root: root.into(),
            invoker,
        }
    }
}

/// The executable part of a task. Bodies must resolve exactly once, by
/// returning; the scheduler awaits the body before moving on.
#[async_trait]
pub trait TaskBody: Send + Sync {
    async fn run(&self, ctx: &TaskContext) -> SluiceResult<TaskOutcome>;
}

/// A named unit of build work. Aggregate tasks carry prerequisites only.
pub struct Task {
    pub name: String,
    pub prerequisites: Vec<String>,
    pub body: Option<Box<dyn TaskBody>>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        prerequisites: Vec<&str>,
        body: impl TaskBody + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            prerequisites: prerequisites.into_iter().map(String::from).collect(),
            body: Some(Box::new(body)),
        }
    }

    /// A task with no body of its own: it only waits for its prerequisites.
    pub fn aggregate(name: impl Into<String>, prerequisites: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            prerequisites: prerequisites.into_iter().map(String::from).collect(),
            body: None,
        }
    }
}

/// Immutable name → task mapping, validated at construction.
pub struct Registry {
    tasks: HashMap<String, Task>,
}

impl Registry {
    /// Build the registry, rejecting duplicate names, prerequisites that
    /// name no registered task, and dependency cycles.
    pub fn new(tasks: Vec<Task>) -> SluiceResult<Self> {
        let mut map = HashMap::new();
        for task in tasks {
            if map.contains_key(&task.name) {
                return Err(SluiceError::Task(format!(
                    "Task '{}' registered more than once",
                    task.name
                )));
            }
            map.insert(task.name.clone(), task);
        }

        let mut graph = DiGraph::<String, ()>::new();
        let mut node_indices = HashMap::new();
        for name in map.keys() {
            let node_index = graph.add_node(name.clone());
            node_indices.insert(name.clone(), node_index);
        }
        for task in map.values() {
            let from_node = node_indices[&task.name];
            for prerequisite in &task.prerequisites {
                let Some(&to_node) = node_indices.get(prerequisite) else {
                    return Err(SluiceError::Task(format!(
                        "Prerequisite '{}' of task '{}' is not registered",
                        prerequisite, task.name
                    )));
                };
                graph.add_edge(from_node, to_node, ());
            }
        }
        if toposort(&graph, None).is_err() {
            return Err(SluiceError::Task(
                "Task prerequisites form a cycle".to_string(),
            ));
        }

        Ok(Self { tasks: map })
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Registered task names, sorted for display.
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl TaskBody for Noop {
        async fn run(&self, _ctx: &TaskContext) -> SluiceResult<TaskOutcome> {
            Ok(TaskOutcome::Completed)
        }
    }

    #[test]
    fn accepts_a_valid_graph() {
        let registry = Registry::new(vec![
            Task::new("compile", vec![], Noop),
            Task::new("lint", vec![], Noop),
            Task::aggregate("default", vec!["lint", "compile"]),
        ])
        .unwrap();
        assert_eq!(registry.task_names(), vec!["compile", "default", "lint"]);
        assert_eq!(
            registry.get("default").unwrap().prerequisites,
            vec!["lint", "compile"]
        );
    }

    #[test]
    fn rejects_unknown_prerequisite() {
        let err = Registry::new(vec![Task::new("tag", vec!["default"], Noop)])
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().contains("'default'"));
    }

    #[test]
    fn rejects_cycles() {
        let err = Registry::new(vec![
            Task::new("a", vec!["b"], Noop),
            Task::new("b", vec!["a"], Noop),
        ])
        .map(|_| ())
        .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Registry::new(vec![
            Task::new("compile", vec![], Noop),
            Task::new("compile", vec![], Noop),
        ])
        .map(|_| ())
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
