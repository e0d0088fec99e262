use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;
use tracing::debug;
use watchtask::{TaskError, TaskExecutor};

/// A fake executor that:
/// - records every `exec` call with the (Tokio) time it arrived
/// - succeeds, except for names marked with [`RecordingExecutor::fail`].
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make later calls for `name` return an error.
    pub fn fail(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|(n, _)| n == name).count()
    }
}

impl TaskExecutor for RecordingExecutor {
    fn exec<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), Instant::now()));
            if self.failing.lock().unwrap().contains(name) {
                debug!(task = %name, "recorded exec, failing as configured");
                return Err(TaskError::TaskNotFound(name.to_string()));
            }
            debug!(task = %name, "recorded exec");
            Ok(())
        })
    }
}
