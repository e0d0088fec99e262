// src/config/validate.rs

use std::collections::BTreeSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WatchtaskError};
use crate::task::{base_name, parse_flags};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchtaskError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    let names: BTreeSet<&str> = cfg.task.keys().map(|k| base_name(k)).collect();
    validate_task_dependencies(cfg, &names)?;
    validate_watches(cfg, &names)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(WatchtaskError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.delay_ms == 0 {
        return Err(WatchtaskError::ConfigError(
            "[config].delay_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Required dependencies must name a declared task. Optional ones may
/// dangle; they fail harmlessly at run time.
fn validate_task_dependencies(cfg: &RawConfigFile, names: &BTreeSet<&str>) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.deps.iter() {
            let (flags, dep_name) = parse_flags(dep);
            if !flags.optional && !names.contains(dep_name) {
                return Err(WatchtaskError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `deps`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_watches(cfg: &RawConfigFile, names: &BTreeSet<&str>) -> Result<()> {
    for (i, watch) in cfg.watch.iter().enumerate() {
        if watch.patterns.is_empty() {
            return Err(WatchtaskError::ConfigError(format!(
                "[[watch]] entry #{} has no patterns",
                i + 1
            )));
        }
        if watch.tasks.is_empty() {
            return Err(WatchtaskError::ConfigError(format!(
                "[[watch]] entry #{} has no tasks",
                i + 1
            )));
        }
        for task in watch.tasks.iter() {
            // Triggers run tasks by exact name, so flags are not allowed here.
            if !names.contains(task.as_str()) {
                return Err(WatchtaskError::ConfigError(format!(
                    "[[watch]] entry #{} refers to unknown task '{}'",
                    i + 1,
                    task
                )));
            }
        }
    }
    Ok(())
}
