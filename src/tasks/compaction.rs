//! Log Compaction Task
//!
//! Background task that periodically compacts the store's write-ahead log.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::store::Store;

/// Spawns a background task that compacts the WAL every `interval`.
///
/// Each wait races the cancellation token, so cancelling it ends an idle
/// wait immediately. A pass that has already started runs to completion;
/// the store re-checks the token under its lock before starting one.
/// A failed pass is logged and retried on the next tick.
///
/// # Arguments
/// * `store` - Store whose log is compacted
/// * `interval` - Time between compaction runs
/// * `cancel` - Token that stops the schedule
///
/// # Returns
/// A JoinHandle that completes once the loop has stopped.
pub fn spawn_compaction_task(
    store: Store,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting log compaction task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            match store.compact_unless_cancelled(&cancel).await {
                Ok(Some(report)) => {
                    debug!(
                        old_size = report.old_size,
                        new_size = report.new_size,
                        "scheduled compaction finished"
                    );
                }
                Ok(None) => debug!("scheduled compaction skipped"),
                Err(e) => error!(error = %e, "Log compaction failed, keeping current log"),
            }
        }

        info!("Log compaction task stopped");
    })
}
