// src/errors.rs

//! Crate-wide error types.
//!
//! - [`TaskError`] covers task registration and execution.
//! - [`ExecError`] is the aggregated outcome of one failed task resolution.
//! - [`Stopped`] marks an action that stopped early on purpose.
//! - [`WatchtaskError`] is the top-level error for config, CLI and watching.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::task::TaskName;

/// Errors produced by the task registry and the dependency executor.
///
/// Registration errors (`NoName`, `DuplicateName`, `Cycle`) are sticky: the
/// registry stores the first one and returns it from every later call.
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    #[error("task defined with an empty name (after flag removal)")]
    NoName,

    #[error("multiple tasks named: {0}")]
    DuplicateName(TaskName),

    #[error("cycle identified: {}", .0.join(", "))]
    Cycle(Vec<TaskName>),

    #[error("task {0} does not exist")]
    TaskNotFound(TaskName),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl TaskError {
    /// True if this is an execution failure whose own error is an
    /// intentional stop (see [`Stopped`]).
    pub fn is_intentional(&self) -> bool {
        matches!(self, TaskError::Exec(err) if err.is_intentional())
    }

    /// The aggregated execution error, if this is one.
    pub fn as_exec(&self) -> Option<&ExecError> {
        match self {
            TaskError::Exec(err) => Some(err),
            _ => None,
        }
    }
}

/// Failures collected while resolving a single task.
///
/// - `own` is the error returned by the task's action, if it ran and failed.
/// - `required` holds failures of required dependencies. If it is non-empty
///   the action never ran.
/// - `optional` holds failures of optional dependencies. They never block the
///   action and are kept for introspection only.
#[derive(Debug, Clone)]
pub struct ExecError {
    task: TaskName,
    own: Option<Arc<anyhow::Error>>,
    required: BTreeMap<TaskName, TaskError>,
    optional: BTreeMap<TaskName, TaskError>,
}

impl ExecError {
    pub(crate) fn new(task: impl Into<TaskName>) -> Self {
        Self {
            task: task.into(),
            own: None,
            required: BTreeMap::new(),
            optional: BTreeMap::new(),
        }
    }

    /// Record the failure of a dependency.
    pub(crate) fn add(&mut self, dep: impl Into<TaskName>, err: TaskError, optional: bool) {
        let failures = if optional {
            &mut self.optional
        } else {
            &mut self.required
        };
        failures.insert(dep.into(), err);
    }

    pub(crate) fn set_own(&mut self, err: anyhow::Error) {
        self.own = Some(Arc::new(err));
    }

    /// Name of the task this error belongs to.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Error returned by the task's own action.
    pub fn own_error(&self) -> Option<&anyhow::Error> {
        self.own.as_deref()
    }

    /// Failures of required dependencies, keyed by dependency name.
    pub fn required(&self) -> &BTreeMap<TaskName, TaskError> {
        &self.required
    }

    /// Failures of optional dependencies, keyed by dependency name.
    pub fn optional(&self) -> &BTreeMap<TaskName, TaskError> {
        &self.optional
    }

    /// Whether any required dependency failed.
    pub fn failed(&self) -> bool {
        !self.required.is_empty()
    }

    /// Whether this failure is an intentional stop: either the task's own
    /// error is one, or the action never ran and every required dependency
    /// failure is itself intentional.
    pub fn is_intentional(&self) -> bool {
        match self.own.as_deref() {
            Some(own) => is_intentional(own),
            None => self.failed() && self.required.values().all(TaskError::is_intentional),
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(own) = &self.own {
            return write!(f, "{own}");
        }
        let failed: Vec<&str> = self.required.keys().map(String::as_str).collect();
        write!(f, "failed dependencies: {}", failed.join(", "))
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let own: &anyhow::Error = self.own.as_deref()?;
        Some(own.as_ref())
    }
}

/// A deliberate early stop of a task action.
///
/// The executor treats it like any other action error (dependents do not
/// run), but consumers such as the watch loop and the CLI exit status report
/// it as a non-failure. The underlying cause stays available via
/// [`Stopped::cause`] and `source()`.
#[derive(Debug)]
pub struct Stopped {
    cause: anyhow::Error,
}

impl Stopped {
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

impl fmt::Display for Stopped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stopped intentionally: {}", self.cause)
    }
}

impl std::error::Error for Stopped {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Wrap `cause` as an intentional stop.
pub fn stop(cause: impl Into<anyhow::Error>) -> anyhow::Error {
    anyhow::Error::new(Stopped {
        cause: cause.into(),
    })
}

/// True if `err` or anything in its chain is a [`Stopped`].
pub fn is_intentional(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.is::<Stopped>())
}

#[derive(Error, Debug)]
pub enum WatchtaskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("file watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WatchtaskError {
    pub fn is_intentional(&self) -> bool {
        match self {
            WatchtaskError::Task(err) => err.is_intentional(),
            WatchtaskError::Other(err) => is_intentional(err),
            _ => false,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchtaskError>;
