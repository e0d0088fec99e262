// src/watch/mod.rs

//! File watching and debounced task triggering.
//!
//! - [`table`] maps watch patterns to task names.
//! - [`patterns`] defines the injected [`Matcher`] / [`Lister`] seams and
//!   their glob-based defaults.
//! - [`notifier`] turns filesystem changes into a stream of paths.
//! - [`debounce`] coalesces repeated triggers per task.
//! - [`watcher`] wires it all to a [`Registry`](crate::task::Registry).

pub mod debounce;
pub mod notifier;
pub mod path_utils;
pub mod patterns;
pub mod table;
pub mod watcher;

pub use debounce::{DEFAULT_DELAY, Debouncer};
pub use notifier::{Notifier, NotifyNotifier, Subscription};
pub use patterns::{GlobLister, GlobMatcher, Lister, Matcher};
pub use table::WatchTable;
pub use watcher::Watcher;
