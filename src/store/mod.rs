//! Store Module
//!
//! The durable key-value store: LRU cache and write-ahead log guarded by a
//! single lock, with recovery on start-up and periodic compaction.

mod compactor;
mod stats;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{current_timestamp_ms, LruCache, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::tasks::spawn_compaction_task;
use crate::wal::{LogOp, LogRecord, WriteAheadLog};

use compactor::compact;

pub use compactor::CompactionReport;
pub use stats::{StatsSnapshot, StoreStats};

/// Type alias for the background task handle
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

// == Store State ==
/// Everything the serialization point protects. Cache and WAL only ever
/// change together while this is locked.
#[derive(Debug)]
struct StoreState {
    cache: LruCache,
    wal: WriteAheadLog,
    stats: StoreStats,
    initialized: bool,
}

impl StoreState {
    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StoreError::NotInitialized)
        }
    }
}

/// Counts from one recovery run.
#[derive(Debug, Default, Clone, Copy)]
struct RecoverySummary {
    applied: usize,
    expired: usize,
    skipped: usize,
}

// == Store ==
/// Persistent, capacity-bounded key-value store.
///
/// Cloning is cheap; clones share the same state, lock and background task.
#[derive(Clone)]
pub struct Store {
    state: Arc<Mutex<StoreState>>,
    shutdown: CancellationToken,
    compaction_task: TaskHandle,
}

impl Store {
    // == Constructor ==
    /// Creates a store over the log at `log_file`. Nothing is read until
    /// [`initialize`](Self::initialize).
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, log_file: impl Into<PathBuf>) -> Self {
        Self::with_wal(capacity, WriteAheadLog::new(log_file))
    }

    /// Creates a store from configuration.
    pub fn from_config(config: &Config) -> Self {
        let wal = WriteAheadLog::new(&config.log_file).with_fsync(config.wal_fsync);
        Self::with_wal(config.capacity, wal)
    }

    /// Creates a store over an already configured WAL handle.
    pub fn with_wal(capacity: usize, wal: WriteAheadLog) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                cache: LruCache::new(capacity),
                wal,
                stats: StoreStats::new(),
                initialized: false,
            })),
            shutdown: CancellationToken::new(),
            compaction_task: Arc::new(Mutex::new(None)),
        }
    }

    // == Initialize ==
    /// Creates the log directory and replays the log into the empty cache.
    ///
    /// Must complete before any other operation. A second call is a no-op.
    pub async fn initialize(&self) -> Result<()> {
        let mut guard = self.state.lock().await;
        if guard.initialized {
            warn!("Store already initialized, ignoring");
            return Ok(());
        }
        let state = &mut *guard;

        state.wal.ensure_parent_dir().await?;
        state.wal.seal_torn_tail().await?;

        let summary = recover(state).await?;
        state.initialized = true;

        info!(
            path = %state.wal.path().display(),
            applied = summary.applied,
            expired = summary.expired,
            skipped = summary.skipped,
            keys = state.cache.len(),
            log_size = state.stats.log_size,
            "Recovery complete"
        );
        Ok(())
    }

    // == Set ==
    /// Stores `key` with an optional TTL in seconds.
    ///
    /// The cache is updated first and the SET record appended second. If the
    /// append fails the error is returned and the cache keeps the new value.
    pub async fn set(&self, key: String, value: String, ttl: Option<u64>) -> Result<()> {
        validate(&key, &value, ttl)?;

        let mut guard = self.state.lock().await;
        guard.ensure_initialized()?;
        let state = &mut *guard;

        let record = LogRecord::set(key.as_str(), value.as_str(), ttl);
        if let Some(evicted) = state.cache.put(key, value, ttl.map(Duration::from_secs)) {
            state.stats.record_eviction();
            debug!(key = %evicted.key, "evicted to make room");
        }

        if let Err(e) = state.wal.append(&record).await {
            warn!(key = %record.key, error = %e, "SET applied in memory but not logged");
            return Err(e);
        }
        state.stats.record_append();
        Ok(())
    }

    // == Get ==
    /// Returns the value for `key`, or `None` if it is absent or expired.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut guard = self.state.lock().await;
        guard.ensure_initialized()?;
        let state = &mut *guard;

        let value = state.cache.get(key);
        match value {
            Some(_) => state.stats.record_hit(),
            None => state.stats.record_miss(),
        }
        Ok(value)
    }

    // == Delete ==
    /// Removes `key`. Returns false if it was absent or expired, in which
    /// case nothing is logged.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut guard = self.state.lock().await;
        guard.ensure_initialized()?;
        let state = &mut *guard;

        if !state.cache.delete(key) {
            return Ok(false);
        }

        if let Err(e) = state.wal.append(&LogRecord::delete(key)).await {
            warn!(key = %key, error = %e, "DEL applied in memory but not logged");
            return Err(e);
        }
        state.stats.record_append();
        Ok(true)
    }

    // == Stats ==
    /// Point-in-time statistics including current size and uptime.
    pub async fn stats(&self) -> StatsSnapshot {
        let state = self.state.lock().await;
        state.stats.snapshot(state.cache.len())
    }

    // == Compact ==
    /// Runs one compaction pass now.
    pub async fn compact(&self) -> Result<Option<CompactionReport>> {
        let mut guard = self.state.lock().await;
        guard.ensure_initialized()?;
        let state = &mut *guard;
        compact(&state.cache, &state.wal, &mut state.stats).await
    }

    /// Scheduled compaction: skipped when shutdown has been signalled.
    ///
    /// The check happens after the lock is taken, so a pass never starts once
    /// `shutdown` has cancelled the token.
    pub(crate) async fn compact_unless_cancelled(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<CompactionReport>> {
        let mut guard = self.state.lock().await;
        if cancel.is_cancelled() {
            debug!("shutdown signalled, skipping compaction");
            return Ok(None);
        }
        guard.ensure_initialized()?;
        let state = &mut *guard;
        compact(&state.cache, &state.wal, &mut state.stats).await
    }

    // == Background Compaction ==
    /// Starts the periodic compaction task.
    ///
    /// # Errors
    /// Returns an error if the task is already running or the store has
    /// been shut down.
    pub async fn start_compaction_task(&self, interval: Duration) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(StoreError::Internal("Store has been shut down".to_string()));
        }

        let mut slot = self.compaction_task.lock().await;
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(StoreError::Internal(
                "Compaction task already running".to_string(),
            ));
        }

        *slot = Some(spawn_compaction_task(
            self.clone(),
            interval,
            self.shutdown.clone(),
        ));
        Ok(())
    }

    /// Returns true while the background compaction task is alive.
    pub async fn is_compaction_running(&self) -> bool {
        let guard = self.compaction_task.lock().await;
        guard.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    // == Shutdown ==
    /// Stops the compaction schedule and waits for an in-flight pass to
    /// finish. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down store");
        self.shutdown.cancel();

        let handle = self.compaction_task.lock().await.take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| StoreError::Internal(format!("Compaction task failed: {e}")))?;
        }

        info!("Store shutdown complete");
        Ok(())
    }
}

// == Recovery ==
/// Replays the WAL into the (empty) cache in file order.
///
/// A SET whose TTL ran out before now removes the key rather than being
/// skipped, so an older value for the same key cannot resurface.
async fn recover(state: &mut StoreState) -> Result<RecoverySummary> {
    let replay = state.wal.replay_all().await?;
    let now_ms = current_timestamp_ms();
    let mut summary = RecoverySummary {
        skipped: replay.skipped,
        ..RecoverySummary::default()
    };

    for record in replay.records {
        let deadline = record.deadline_ms();
        match record.op {
            LogOp::Set { value, .. } => match deadline {
                Some(deadline) if deadline <= now_ms => {
                    state.cache.delete(&record.key);
                    summary.expired += 1;
                }
                deadline => {
                    state.cache.put_with_deadline(record.key, value, deadline);
                    summary.applied += 1;
                }
            },
            LogOp::Del => {
                state.cache.delete(&record.key);
                summary.applied += 1;
            }
        }
    }

    state.stats.set_log_size(replay.lines);
    Ok(summary)
}

// == Validation ==
fn validate(key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(StoreError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if value.len() > MAX_VALUE_SIZE {
        return Err(StoreError::InvalidRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    if ttl == Some(0) {
        return Err(StoreError::InvalidRequest(
            "TTL must be a positive number of seconds".to_string(),
        ));
    }
    Ok(())
}
