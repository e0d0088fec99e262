use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::mpsc;
use watchtask::watch::{Notifier, Subscription};

type Receivers = (
    mpsc::UnboundedReceiver<PathBuf>,
    mpsc::UnboundedReceiver<anyhow::Error>,
);

/// A [`Notifier`] fed by hand through a [`NotifierHandle`].
///
/// Only one subscription is supported; a second `subscribe` fails.
pub struct ChannelNotifier {
    receivers: Mutex<Option<Receivers>>,
    subscribed: Arc<Mutex<Vec<PathBuf>>>,
}

/// Sending side of a [`ChannelNotifier`].
#[derive(Clone)]
pub struct NotifierHandle {
    events: Arc<Mutex<Option<mpsc::UnboundedSender<PathBuf>>>>,
    errors: Arc<Mutex<Option<mpsc::UnboundedSender<anyhow::Error>>>>,
    subscribed: Arc<Mutex<Vec<PathBuf>>>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, NotifierHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let subscribed = Arc::new(Mutex::new(Vec::new()));

        let notifier = Self {
            receivers: Mutex::new(Some((event_rx, error_rx))),
            subscribed: Arc::clone(&subscribed),
        };
        let handle = NotifierHandle {
            events: Arc::new(Mutex::new(Some(event_tx))),
            errors: Arc::new(Mutex::new(Some(error_tx))),
            subscribed,
        };
        (notifier, handle)
    }
}

impl Notifier for ChannelNotifier {
    fn subscribe(&self, dirs: &[PathBuf]) -> anyhow::Result<Subscription> {
        let (events, errors) = self
            .receivers
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow!("ChannelNotifier supports a single subscription"))?;
        self.subscribed.lock().unwrap().extend_from_slice(dirs);
        Ok(Subscription::new(events, errors, ()))
    }
}

impl NotifierHandle {
    /// Report a change to `path`. Ignored once closed.
    pub fn send_event(&self, path: impl Into<PathBuf>) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(path.into());
        }
    }

    /// Report a notifier-internal error. Ignored once closed.
    pub fn send_error(&self, msg: &'static str) {
        if let Some(tx) = self.errors.lock().unwrap().as_ref() {
            let _ = tx.send(anyhow!(msg));
        }
    }

    /// Close both streams, which ends the watch loop.
    pub fn close(&self) {
        self.events.lock().unwrap().take();
        self.errors.lock().unwrap().take();
    }

    /// Directories passed to `subscribe`.
    pub fn subscribed_dirs(&self) -> Vec<PathBuf> {
        self.subscribed.lock().unwrap().clone()
    }
}

/// A [`Notifier`] whose construction always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn subscribe(&self, _dirs: &[PathBuf]) -> anyhow::Result<Subscription> {
        Err(anyhow!("notifier unavailable"))
    }
}
