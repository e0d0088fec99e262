// src/exec/resolve.rs

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::errors::{ExecError, TaskError};
use crate::exec::ExecContext;
use crate::task::{Task, parse_flags};

/// Boxed resolution future; boxing breaks the recursion between
/// [`resolve`] and [`ExecContext::resolve_once`].
pub type ResolveFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Resolve every dependency of `task` concurrently, then run its action if no
/// required dependency failed.
pub(crate) fn resolve(ctx: ExecContext, task: Arc<Task>) -> ResolveFuture {
    Box::pin(async move {
        let mut errors = ExecError::new(task.name());
        let mut pending = JoinSet::new();
        // Spawned resolution id -> (dependency name, optional)
        let mut edges = HashMap::new();

        for raw in task.deps() {
            let (edge, name) = parse_flags(raw);
            let Some(dep) = ctx.task(name) else {
                debug!(task = %task.name(), dep = %name, "dependency is not registered");
                errors.add(name, TaskError::TaskNotFound(name.to_string()), edge.optional);
                continue;
            };

            let flags = edge.union(dep.flags());
            debug!(
                task = %task.name(),
                dep = %name,
                multi = flags.multi,
                optional = flags.optional,
                "resolving dependency"
            );
            let resolution = if flags.multi {
                resolve(ctx.clone(), dep)
            } else {
                ctx.resolve_once(dep)
            };
            let handle = pending.spawn(resolution);
            edges.insert(handle.id(), (name.to_string(), flags.optional));
        }

        while let Some(joined) = pending.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(err) => {
                    let id = err.id();
                    let name = edges.get(&id).map(|(name, _)| name.as_str()).unwrap_or_default();
                    (id, Err(panicked(name, err)))
                }
            };
            let Some((name, optional)) = edges.remove(&id) else {
                continue;
            };
            if let Err(err) = outcome {
                errors.add(name, err, optional);
            }
        }

        if errors.failed() {
            warn!(
                task = %task.name(),
                failed = ?errors.required().keys().collect::<Vec<_>>(),
                "required dependencies failed; not running task"
            );
            return Err(errors.into());
        }

        if let Err(err) = run_action(&ctx, &task).await {
            errors.set_own(err);
            return Err(errors.into());
        }
        Ok(())
    })
}

/// Run the task's own action on a separate Tokio task, holding an action
/// slot for its duration.
async fn run_action(ctx: &ExecContext, task: &Task) -> anyhow::Result<()> {
    let _permit = ctx.acquire().await;
    debug!(task = %task.name(), "running task action");
    match tokio::spawn(task.run()).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => Err(anyhow!("task {} panicked", task.name())),
        Err(_) => Err(anyhow!("task {} was cancelled", task.name())),
    }
}

/// Error recorded for a resolution whose Tokio task did not complete.
pub(crate) fn panicked(name: &str, err: JoinError) -> TaskError {
    let mut exec = ExecError::new(name);
    if err.is_panic() {
        exec.set_own(anyhow!("task {name} panicked"));
    } else {
        exec.set_own(anyhow!("task {name} was cancelled"));
    }
    TaskError::Exec(exec)
}
