// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::TaskError;
use crate::exec::ExecOptions;
use crate::exec::command::shell_action;
use crate::task::{Registry, base_name};

/// Build file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// delay_ms = 10
/// max_parallel = 4
/// default_task = "build"
///
/// [task.build]
/// cmd = "cargo build"
/// deps = ["fmt?", "codegen+"]
///
/// [[watch]]
/// patterns = ["src/**/*.rs"]
/// tasks = ["build"]
/// ```
///
/// Task keys may carry trailing flags, e.g. `[task."codegen+"]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by name (flags included).
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// All `[[watch]]` entries, in file order.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// Validated build file. Construct via `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    tasks: BTreeMap<String, TaskConfig>,
    watches: Vec<WatchConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Debounce delay for watch triggers, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Maximum number of task actions running at once. `0` means unbounded;
    /// unset means one per available CPU.
    #[serde(default)]
    pub max_parallel: Option<usize>,

    /// Task run when none is named on the command line.
    #[serde(default = "default_task")]
    pub default_task: String,
}

fn default_delay_ms() -> u64 {
    10
}

fn default_task() -> String {
    "default".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_parallel: None,
            default_task: default_task(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Shell command to run.
    pub cmd: String,

    /// Dependencies, each optionally flagged (`?`, `+`, `*`).
    #[serde(default)]
    pub deps: Vec<String>,

    /// Exit code treated as an intentional stop rather than a failure.
    #[serde(default)]
    pub stop_code: Option<i32>,
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub patterns: Vec<String>,
    pub tasks: Vec<String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        tasks: BTreeMap<String, TaskConfig>,
        watches: Vec<WatchConfig>,
    ) -> Self {
        Self {
            config,
            tasks,
            watches,
        }
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.tasks
    }

    /// Look up a task section by name; flags on either side are ignored.
    pub fn task(&self, name: &str) -> Option<(&str, &TaskConfig)> {
        let wanted = base_name(name);
        self.tasks
            .iter()
            .find(|(key, _)| base_name(key) == wanted)
            .map(|(key, task)| (key.as_str(), task))
    }

    pub fn watches(&self) -> &[WatchConfig] {
        &self.watches
    }

    pub fn default_task(&self) -> &str {
        &self.config.default_task
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.config.delay_ms)
    }

    pub fn exec_options(&self) -> ExecOptions {
        match self.config.max_parallel {
            Some(max_parallel_actions) => ExecOptions {
                max_parallel_actions,
            },
            None => ExecOptions::default(),
        }
    }

    /// Register one shell action per task, in key order.
    ///
    /// Duplicate names and cycles are reported by the registry, which is
    /// left poisoned.
    pub fn register_into(&self, registry: &mut Registry) -> Result<(), TaskError> {
        for (name, task) in &self.tasks {
            let action = shell_action(base_name(name), &task.cmd, task.stop_code);
            registry.register_action(name, action, &task.deps)?;
        }
        Ok(())
    }
}
