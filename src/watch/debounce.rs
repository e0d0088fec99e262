// src/watch/debounce.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::exec::TaskExecutor;
use crate::task::TaskName;

/// Debounce delay used when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// Coalesces bursts of triggers per task name into a single `exec`.
///
/// Each name is either idle (no entry) or pending (an entry holding its
/// deadline). A trigger on an idle name arms a timer; a trigger on a pending
/// name pushes its deadline out by the full delay. When a deadline passes
/// untouched the entry is removed and the task runs once.
#[derive(Clone)]
pub struct Debouncer {
    pending: Arc<Mutex<HashMap<TaskName, Instant>>>,
    delay: Duration,
    executor: Arc<dyn TaskExecutor>,
}

impl Debouncer {
    pub fn new(executor: Arc<dyn TaskExecutor>, delay: Duration) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            delay,
            executor,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Names with an armed timer.
    pub fn pending(&self) -> Vec<TaskName> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.keys().cloned().collect()
    }

    /// Arm or reset the timer for `name`. Must be called within a Tokio
    /// runtime.
    pub fn trigger(&self, name: &str) {
        let deadline = Instant::now() + self.delay;
        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(current) = pending.get_mut(name) {
                debug!(task = %name, "debounce timer reset");
                *current = deadline;
                return;
            }
            pending.insert(name.to_string(), deadline);
        }

        debug!(task = %name, delay_ms = self.delay.as_millis() as u64, "debounce timer armed");
        let debouncer = self.clone();
        let name = name.to_string();
        tokio::spawn(async move { debouncer.fire_when_quiet(name, deadline).await });
    }

    async fn fire_when_quiet(self, name: TaskName, mut deadline: Instant) {
        loop {
            sleep_until(deadline).await;
            let pending_until = {
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                match pending.get(&name).copied() {
                    Some(current) if current > deadline => Some(current),
                    _ => {
                        pending.remove(&name);
                        None
                    }
                }
            };
            match pending_until {
                Some(later) => deadline = later,
                None => break,
            }
        }

        match self.executor.exec(&name).await {
            Ok(()) => info!(task = %name, "triggered task finished"),
            Err(err) if err.is_intentional() => {
                info!(task = %name, reason = %err, "triggered task stopped intentionally")
            }
            Err(err) => warn!(task = %name, error = %err, "triggered task failed"),
        }
    }
}
