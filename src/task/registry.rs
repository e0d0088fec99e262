// src/task/registry.rs

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::model::ConfigFile;
use crate::errors::TaskError;
use crate::exec::{self, ExecOptions};
use crate::task::{Action, Task, TaskName, action, base_name, parse_flags};

/// Whether the registry still accepts work.
#[derive(Debug, Clone)]
enum RegistryState {
    Active,
    /// A registration error occurred. Every later call returns it unchanged.
    Poisoned(TaskError),
}

/// Named tasks plus the sticky registration error.
///
/// Tasks are registered up front; cycle detection runs on each
/// registration. Once a registration fails the registry is poisoned and
/// neither accepts nor executes tasks again.
#[derive(Debug, Clone)]
pub struct Registry {
    tasks: Arc<HashMap<TaskName, Arc<Task>>>,
    state: RegistryState,
    options: ExecOptions,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_options(ExecOptions::default())
    }

    pub fn with_options(options: ExecOptions) -> Self {
        Self {
            tasks: Arc::new(HashMap::new()),
            state: RegistryState::Active,
            options,
        }
    }

    /// Build a registry from a validated [`ConfigFile`], one shell action per
    /// `[task.<name>]` section.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self, TaskError> {
        let mut registry = Self::with_options(cfg.exec_options());
        cfg.register_into(&mut registry)?;
        Ok(registry)
    }

    /// Register an async closure under `name` with the given dependencies.
    ///
    /// `name` and each dependency may carry trailing flags (`?`, `+`, `*`).
    pub fn register<F, Fut, I>(&mut self, name: &str, f: F, deps: I) -> Result<(), TaskError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.register_action(name, action(f), deps)
    }

    /// Register a pre-built [`Action`].
    pub fn register_action<I>(&mut self, name: &str, action: Action, deps: I) -> Result<(), TaskError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.check()?;

        let deps: Vec<String> = deps.into_iter().map(|d| d.as_ref().to_string()).collect();
        let (flags, base) = parse_flags(name);

        let validated = if base.is_empty() {
            Err(TaskError::NoName)
        } else if self.tasks.contains_key(base) {
            Err(TaskError::DuplicateName(base.to_string()))
        } else if let Some(chain) = self.find_cycle(base, &deps) {
            Err(TaskError::Cycle(chain))
        } else {
            Ok(())
        };

        if let Err(err) = validated {
            warn!(task = %name, error = %err, "task registration failed; registry is now unusable");
            self.state = RegistryState::Poisoned(err.clone());
            return Err(err);
        }

        debug!(
            task = %base,
            ?deps,
            multi = flags.multi,
            optional = flags.optional,
            "registered task"
        );

        let task = Task::new(base.to_string(), deps, action, flags);
        Arc::make_mut(&mut self.tasks).insert(base.to_string(), Arc::new(task));
        Ok(())
    }

    /// Run `name` after resolving its dependency graph.
    ///
    /// `name` is looked up verbatim: flag suffixes belong to registrations
    /// and dependency references, so `exec("a?")` does not find task `a`.
    ///
    /// Every call gets its own execution context, so a failed run leaves the
    /// registry usable for the next one.
    pub async fn exec(&self, name: &str) -> Result<(), TaskError> {
        self.check()?;

        let task = match self.tasks.get(name) {
            Some(task) => Arc::clone(task),
            None => return Err(TaskError::TaskNotFound(name.to_string())),
        };

        exec::execute(Arc::clone(&self.tasks), &self.options, task).await
    }

    /// The stored registration error, if the registry is poisoned.
    pub fn error(&self) -> Option<&TaskError> {
        match &self.state {
            RegistryState::Active => None,
            RegistryState::Poisoned(err) => Some(err),
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.error().is_some()
    }

    /// Look up a task by its flag-free name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name).map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn check(&self) -> Result<(), TaskError> {
        match &self.state {
            RegistryState::Active => Ok(()),
            RegistryState::Poisoned(err) => Err(err.clone()),
        }
    }

    /// Look for a path from `deps` back to `name` through already registered
    /// tasks. Returns the chain of names forming the cycle, starting at
    /// `name`.
    ///
    /// Only flag-stripped names are compared, so a multi-flagged self edge is
    /// still a cycle here.
    fn find_cycle(&self, name: &str, deps: &[String]) -> Option<Vec<TaskName>> {
        let mut cleared = HashSet::new();
        self.search(name, name, deps, &mut cleared)
    }

    fn search<'a>(
        &'a self,
        target: &str,
        current: &str,
        deps: &'a [String],
        cleared: &mut HashSet<&'a str>,
    ) -> Option<Vec<TaskName>> {
        for dep in deps {
            let dep = base_name(dep);
            if dep == target {
                return Some(vec![current.to_string()]);
            }
            // Nodes already searched without reaching `target` cannot reach it now.
            if !cleared.insert(dep) {
                continue;
            }
            if let Some(task) = self.tasks.get(dep) {
                if let Some(mut chain) = self.search(target, dep, task.deps(), cleared) {
                    chain.insert(0, current.to_string());
                    return Some(chain);
                }
            }
        }
        None
    }
}
