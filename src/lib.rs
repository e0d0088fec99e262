// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod task;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, execution_order, load_and_validate};
use crate::errors::{Result, WatchtaskError};
use crate::watch::Watcher;

pub use crate::errors::{ExecError, Stopped, TaskError, is_intentional, stop};
pub use crate::exec::{ExecOptions, TaskExecutor};
pub use crate::task::{Flags, Registry, Task, TaskName, action, blocking, parse_flags};

/// High-level entry point used by `main.rs`.
///
/// - load and validate the build file
/// - run the requested task once
/// - with `--watch`, keep re-running watched tasks until Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let task = args
        .task
        .clone()
        .unwrap_or_else(|| cfg.default_task().to_string());

    if args.dry_run {
        print_dry_run(&cfg, &task)?;
        return Ok(());
    }

    let root = config_root_dir(&args.config);
    let delay = args
        .delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| cfg.delay());
    let watcher = Watcher::from_config(&cfg, &root)?.with_delay(delay);

    let outcome = watcher.exec(&task).await;
    if !args.watch {
        return outcome.map_err(WatchtaskError::from);
    }

    match outcome {
        Ok(()) => {}
        Err(err) if err.is_intentional() => info!(task = %task, reason = %err, "initial run stopped intentionally"),
        Err(err) => warn!(task = %task, error = %err, "initial run failed; watching anyway"),
    }

    if watcher.table().is_empty() {
        return Err(WatchtaskError::ConfigError(
            "--watch given but the build file has no [[watch]] entries".to_string(),
        ));
    }

    tokio::select! {
        res = watcher.start() => res,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("received Ctrl-C; shutting down");
            Ok(())
        }
    }
}

/// Directory that watch patterns are relative to.
///
/// - If the config path has a non-empty parent (e.g. "configs/Watchtask.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Watchtask.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print the tasks `task` would run, dependencies first, plus the watch
/// table.
fn print_dry_run(cfg: &ConfigFile, task: &str) -> Result<()> {
    let order = execution_order(cfg, task)?;

    println!("watchtask dry-run");
    println!("  config.delay_ms = {}", cfg.config().delay_ms);
    match cfg.config().max_parallel {
        Some(n) if n > 0 => println!("  config.max_parallel = {n}"),
        _ => println!("  config.max_parallel = (unbounded)"),
    }
    println!();

    println!("run order for '{task}' ({}):", order.len());
    for (i, planned) in order.iter().enumerate() {
        println!("  {}. {}", i + 1, planned.name);
        println!("      cmd: {}", planned.cmd);
        if !planned.deps.is_empty() {
            println!("      deps: {:?}", planned.deps);
        }
    }

    if !cfg.watches().is_empty() {
        println!();
        println!("watch ({}):", cfg.watches().len());
        for entry in cfg.watches() {
            println!("  - {:?} -> {:?}", entry.patterns, entry.tasks);
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
