// src/exec/mod.rs

//! Dependency executor.
//!
//! - [`context`] holds the per-request once-cache and the action limiter.
//! - [`resolve`] walks a task's dependencies concurrently and aggregates
//!   their failures.
//! - [`command`] builds shell-command actions for tasks declared in a
//!   build file.
//!
//! The [`TaskExecutor`] trait is the seam the watch layer drives, so tests
//! can swap in a recording executor without real tasks.

pub mod command;
pub mod context;
pub mod resolve;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::errors::TaskError;
use crate::task::{Registry, Task, TaskName};

pub use context::ExecContext;

/// Tuning for a single top-level execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Maximum number of task actions running at once within one `exec`
    /// call. `0` (the default) means unbounded, so a long-running action
    /// never holds up unrelated siblings.
    ///
    /// Only running actions hold a slot; tasks waiting on dependencies do
    /// not, so the bound cannot deadlock a deep graph.
    pub max_parallel_actions: usize,
}

impl ExecOptions {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Anything that can run a named task to completion.
///
/// [`Registry`] is the production implementation.
pub trait TaskExecutor: Send + Sync {
    fn exec<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'a>>;
}

impl TaskExecutor for Registry {
    fn exec<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'a>> {
        Box::pin(Registry::exec(self, name))
    }
}

/// Resolve `task` in a fresh execution context.
pub(crate) async fn execute(
    tasks: Arc<HashMap<TaskName, Arc<Task>>>,
    options: &ExecOptions,
    task: Arc<Task>,
) -> Result<(), TaskError> {
    let name = task.name().to_string();
    let started = Instant::now();
    info!(task = %name, "executing task graph");

    let ctx = ExecContext::new(tasks, options);
    let outcome = match tokio::spawn(ctx.resolve_once(task)).await {
        Ok(outcome) => outcome,
        Err(err) => Err(resolve::panicked(&name, err)),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        Ok(()) => info!(task = %name, elapsed_ms, "task graph finished"),
        Err(err) if err.is_intentional() => {
            info!(task = %name, elapsed_ms, reason = %err, "task graph stopped intentionally")
        }
        Err(err) => warn!(task = %name, elapsed_ms, error = %err, "task graph failed"),
    }
    outcome
}
