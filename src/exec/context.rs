// src/exec/context.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::errors::TaskError;
use crate::exec::ExecOptions;
use crate::exec::resolve::{self, ResolveFuture};
use crate::task::{Task, TaskName};

/// Memoized outcome of one task within a context. The first resolver takes
/// the write lock and computes; once the result is published, later resolvers
/// share the read lock and clone it.
type Slot = tokio::sync::RwLock<Option<Result<(), TaskError>>>;

/// State shared by every resolution spawned for one top-level `exec` call.
///
/// Cheap to clone; all clones see the same once-cache and action limiter.
#[derive(Clone)]
pub struct ExecContext {
    inner: Arc<Inner>,
}

struct Inner {
    tasks: Arc<HashMap<TaskName, Arc<Task>>>,
    slots: Mutex<HashMap<TaskName, Arc<Slot>>>,
    limiter: Option<Arc<Semaphore>>,
}

impl ExecContext {
    pub(crate) fn new(tasks: Arc<HashMap<TaskName, Arc<Task>>>, options: &ExecOptions) -> Self {
        let limiter = match options.max_parallel_actions {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };
        Self {
            inner: Arc::new(Inner {
                tasks,
                slots: Mutex::new(HashMap::new()),
                limiter,
            }),
        }
    }

    /// Look up a registered task by base name.
    pub(crate) fn task(&self, name: &str) -> Option<Arc<Task>> {
        self.inner.tasks.get(name).cloned()
    }

    /// Resolve `task` at most once in this context.
    ///
    /// Concurrent callers for the same task share a single resolution and all
    /// observe its result.
    pub(crate) fn resolve_once(&self, task: Arc<Task>) -> ResolveFuture {
        let ctx = self.clone();
        Box::pin(async move {
            let slot = ctx.slot(task.name());
            if let Some(cached) = slot.read().await.as_ref() {
                debug!(task = %task.name(), "reusing resolved task");
                return cached.clone();
            }

            let mut outcome = slot.write().await;
            // Another resolver may have produced it while we waited.
            if let Some(cached) = outcome.as_ref() {
                debug!(task = %task.name(), "reusing resolved task");
                return cached.clone();
            }

            let result = resolve::resolve(ctx.clone(), task).await;
            *outcome = Some(result.clone());
            result
        })
    }

    /// Wait for an action slot. `None` when actions are unbounded.
    pub(crate) async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        let limiter = self.inner.limiter.as_ref()?;
        // Never closed.
        Arc::clone(limiter).acquire_owned().await.ok()
    }

    fn slot(&self, name: &str) -> Arc<Slot> {
        let mut slots = self
            .inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_default())
    }
}
