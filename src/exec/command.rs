// src/exec/command.rs

//! Shell-command actions for tasks declared in a build file.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors;
use crate::task::{Action, ActionFuture};

/// Build an [`Action`] that runs `cmd` through the platform shell.
///
/// A non-zero exit is an error. If `stop_code` is set and the process exits
/// with exactly that code, the error is marked as an intentional stop.
pub fn shell_action(task: &str, cmd: &str, stop_code: Option<i32>) -> Action {
    let task: Arc<str> = Arc::from(task);
    let cmd: Arc<str> = Arc::from(cmd);
    Arc::new(move || -> ActionFuture {
        let task = Arc::clone(&task);
        let cmd = Arc::clone(&cmd);
        Box::pin(async move { run_command(&task, &cmd, stop_code).await })
    })
}

async fn run_command(task: &str, cmd: &str, stop_code: Option<i32>) -> Result<()> {
    info!(task = %task, cmd = %cmd, "starting task process");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    // Always consume stderr so the pipe never fills.
    let stderr_task = child.stderr.take().map(|stderr| {
        let task = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task, "stderr: {}", line);
            }
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{task}'"))?;

    if let Some(handle) = stderr_task {
        // The reader ends at EOF once the child has exited.
        let _ = handle.await;
    }

    let code = status.code().unwrap_or(-1);
    info!(
        task = %task,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    if status.success() {
        return Ok(());
    }

    let err = anyhow!("command `{cmd}` for task '{task}' exited with status {code}");
    if stop_code == Some(code) {
        return Err(errors::stop(err));
    }
    Err(err)
}
