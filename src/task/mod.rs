// src/task/mod.rs

//! Task definitions and the registry that validates them.
//!
//! - [`flags`] decodes the `?`/`+`/`*` suffixes on names.
//! - [`registry`] stores tasks, rejects cycles and poisons itself on the
//!   first registration error.

pub mod flags;
pub mod registry;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use flags::{Flags, base_name, parse_flags};
pub use registry::Registry;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Future returned by a task action.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Type-erased, zero-argument, fallible task action.
pub type Action = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// Build an [`Action`] from an async closure.
pub fn action<F, Fut>(f: F) -> Action
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move || -> ActionFuture { Box::pin(f()) })
}

/// Build an [`Action`] from a synchronous closure.
///
/// The closure runs on Tokio's blocking pool so it may do file IO or heavy
/// work without stalling other tasks.
pub fn blocking<F>(f: F) -> Action
where
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move || -> ActionFuture {
        let f = Arc::clone(&f);
        Box::pin(async move { tokio::task::spawn_blocking(move || f()).await? })
    })
}

/// A registered task. Immutable once stored in a [`Registry`].
#[derive(Clone)]
pub struct Task {
    name: TaskName,
    /// Raw dependency strings, each still carrying its own edge flags.
    deps: Vec<String>,
    action: Action,
    flags: Flags,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl Task {
    pub(crate) fn new(name: TaskName, deps: Vec<String>, action: Action, flags: Flags) -> Self {
        Self {
            name,
            deps,
            action,
            flags,
        }
    }

    /// Base name (flags stripped).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    /// Task-level flags parsed from the registered name.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Start one invocation of the action.
    pub(crate) fn run(&self) -> ActionFuture {
        (self.action)()
    }
}
