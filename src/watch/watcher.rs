// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{Result, TaskError};
use crate::task::Registry;
use crate::watch::debounce::{DEFAULT_DELAY, Debouncer};
use crate::watch::notifier::{Notifier, NotifyNotifier};
use crate::watch::path_utils::parent_dir;
use crate::watch::patterns::{GlobLister, GlobMatcher, Lister, Matcher};
use crate::watch::table::WatchTable;

/// A [`Registry`] plus a watch table that re-runs tasks when files change.
///
/// Matching, listing and change notification are injected collaborators;
/// by default they are glob-based and backed by `notify`, rooted at the
/// current directory.
pub struct Watcher {
    registry: Registry,
    table: WatchTable,
    matcher: Arc<dyn Matcher>,
    lister: Arc<dyn Lister>,
    notifier: Box<dyn Notifier>,
    delay: Duration,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("registry", &self.registry)
            .field("table", &self.table)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    pub fn new(registry: Registry) -> Self {
        Self::rooted(registry, ".")
    }

    /// A watcher whose default glob collaborators resolve patterns against
    /// `root`.
    pub fn rooted(registry: Registry, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        Self {
            registry,
            table: WatchTable::new(),
            matcher: Arc::new(GlobMatcher::new(&root)),
            lister: Arc::new(GlobLister::new(&root)),
            notifier: Box::new(NotifyNotifier),
            delay: DEFAULT_DELAY,
        }
    }

    /// Build the registry and watch table described by a validated config,
    /// with patterns relative to `root`.
    pub fn from_config(cfg: &ConfigFile, root: impl AsRef<Path>) -> Result<Self> {
        let registry = Registry::from_config(cfg)?;
        let mut watcher = Self::rooted(registry, root).with_delay(cfg.delay());
        for entry in cfg.watches() {
            watcher.watch(&entry.patterns, &entry.tasks);
        }
        Ok(watcher)
    }

    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    pub fn with_lister(mut self, lister: impl Lister + 'static) -> Self {
        self.lister = Arc::new(lister);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Trigger `tasks` whenever a path matching any of `patterns` changes.
    pub fn watch<P, T>(&mut self, patterns: P, tasks: T)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        self.table.watch(patterns, tasks);
    }

    /// Register a task on the wrapped registry.
    pub fn register<F, Fut, I>(&mut self, name: &str, f: F, deps: I) -> std::result::Result<(), TaskError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.registry.register(name, f, deps)
    }

    /// Run a task once, without waiting for file changes.
    pub async fn exec(&self, name: &str) -> std::result::Result<(), TaskError> {
        self.registry.exec(name).await
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn table(&self) -> &WatchTable {
        &self.table
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Directories containing any file currently covered by a watch pattern.
    ///
    /// Computed once per `start`; directories created later are not picked
    /// up. Patterns the lister fails on are skipped.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = BTreeSet::new();
        for pattern in self.table.patterns() {
            match self.lister.list(pattern) {
                Ok(paths) => dirs.extend(paths.iter().map(|p| parent_dir(p))),
                Err(err) => warn!(pattern, error = %err, "failed to list watch pattern"),
            }
        }
        dirs.into_iter().collect()
    }

    /// Watch the filesystem and run matching tasks, debounced per task.
    ///
    /// Fails only if the notifier cannot subscribe. Errors reported on the
    /// notifier's error stream are logged and ignored. Returns `Ok(())` once
    /// the notifier's event stream closes.
    pub async fn start(self) -> Result<()> {
        let dirs = self.watched_dirs();
        let mut subscription = self.notifier.subscribe(&dirs)?;
        info!(
            dirs = dirs.len(),
            patterns = self.table.len(),
            delay_ms = self.delay.as_millis() as u64,
            "watching for changes"
        );

        let debouncer = Debouncer::new(Arc::new(self.registry), self.delay);
        let mut errors_open = true;

        loop {
            tokio::select! {
                event = subscription.events.recv() => {
                    let Some(path) = event else {
                        info!("change notifications closed; watch loop finished");
                        return Ok(());
                    };
                    dispatch(&self.table, self.matcher.as_ref(), &debouncer, &path);
                }
                err = subscription.errors.recv(), if errors_open => match err {
                    Some(err) => warn!(error = %err, "file watcher reported an error"),
                    None => errors_open = false,
                },
            }
        }
    }
}

/// Trigger every task whose pattern matches `path`.
fn dispatch(table: &WatchTable, matcher: &dyn Matcher, debouncer: &Debouncer, path: &Path) {
    for (pattern, tasks) in table.iter() {
        match matcher.matches(pattern, path) {
            Ok(true) => {
                debug!(path = ?path, pattern, ?tasks, "change matched watch pattern");
                for task in tasks {
                    debouncer.trigger(task);
                }
            }
            Ok(false) => {}
            Err(err) => debug!(path = ?path, pattern, error = %err, "matcher failed; treating as no match"),
        }
    }
}
