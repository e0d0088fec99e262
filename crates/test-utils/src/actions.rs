use std::future::{Ready, ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

/// Counts how often the actions it hands out are invoked.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    count: Arc<AtomicUsize>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Action that counts and succeeds.
    pub fn ok(&self) -> impl Fn() -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
        let count = Arc::clone(&self.count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            ready(Ok(()))
        }
    }

    /// Action that counts and fails with `msg`.
    pub fn failing(
        &self,
        msg: &'static str,
    ) -> impl Fn() -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
        let count = Arc::clone(&self.count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            ready(Err(anyhow!(msg)))
        }
    }

    /// Action that counts and stops intentionally with `msg` as the cause.
    pub fn stopping(
        &self,
        msg: &'static str,
    ) -> impl Fn() -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
        let count = Arc::clone(&self.count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            ready(Err(watchtask::stop(anyhow!(msg))))
        }
    }
}

/// Shared, ordered log of action invocations.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action that appends `name` and succeeds.
    pub fn record(
        &self,
        name: &str,
    ) -> impl Fn() -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        let name = name.to_string();
        move || {
            entries.lock().unwrap().push(name.clone());
            ready(Ok(()))
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.entries().iter().filter(|e| *e == name).count()
    }
}
