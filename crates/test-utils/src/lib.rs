pub mod actions;
pub mod builders;
pub mod notifier;
pub mod recording;

pub use actions::{Counter, Journal};
pub use builders::{ConfigFileBuilder, TaskConfigBuilder};
pub use notifier::{ChannelNotifier, FailingNotifier, NotifierHandle};
pub use recording::RecordingExecutor;

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};
use watchtask::logging::LOG_ENV;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Filtered by `WATCHTASK_LOG` (default `warn`), so executor and watch-loop
/// logs only show up for failing tests, or with `--nocapture`:
/// `WATCHTASK_LOG=watchtask=debug cargo test -- --nocapture`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
