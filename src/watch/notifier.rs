// src/watch/notifier.rs

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Source of filesystem change notifications.
pub trait Notifier: Send + Sync {
    /// Start watching `dirs` (non-recursively).
    ///
    /// An error here is fatal for the watch loop.
    fn subscribe(&self, dirs: &[PathBuf]) -> Result<Subscription>;
}

/// Live notification streams for one [`Notifier::subscribe`] call.
///
/// Dropping the subscription stops the underlying watcher.
pub struct Subscription {
    /// One path per changed file.
    pub events: mpsc::UnboundedReceiver<PathBuf>,
    pub errors: mpsc::UnboundedReceiver<anyhow::Error>,
    _guard: Box<dyn Any + Send>,
}

impl Subscription {
    /// `guard` is kept alive for as long as the subscription exists.
    pub fn new(
        events: mpsc::UnboundedReceiver<PathBuf>,
        errors: mpsc::UnboundedReceiver<anyhow::Error>,
        guard: impl Any + Send,
    ) -> Self {
        Self {
            events,
            errors,
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// [`Notifier`] backed by the platform's native watcher via `notify`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyNotifier;

impl Notifier for NotifyNotifier {
    fn subscribe(&self, dirs: &[PathBuf]) -> Result<Subscription> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        // Called synchronously on notify's own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    for path in event.paths {
                        // Receiver gone means the watch loop has stopped.
                        let _ = event_tx.send(path);
                    }
                }
                Err(err) => {
                    let _ = error_tx.send(anyhow::Error::new(err));
                }
            },
            Config::default(),
        )?;

        let mut watched = 0usize;
        for dir in dirs {
            match watcher.watch(dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    debug!(dir = ?dir, "watching directory");
                    watched += 1;
                }
                Err(err) => warn!(dir = ?dir, error = %err, "failed to watch directory; skipping"),
            }
        }
        info!(watched, requested = dirs.len(), "file watcher started");

        Ok(Subscription::new(event_rx, error_rx, watcher))
    }
}
