//! Compactor Module
//!
//! Rewrites the WAL so it holds one SET per live key and nothing else.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::cache::{current_timestamp_ms, LruCache};
use crate::error::Result;
use crate::store::StoreStats;
use crate::wal::{LogRecord, WriteAheadLog};

/// Summary of a completed compaction pass.
#[derive(Debug, Clone)]
pub struct CompactionReport {
    /// WAL lines before the pass
    pub old_size: usize,
    /// WAL lines after the pass
    pub new_size: usize,
    /// Entries left out because they had already expired
    pub expired: usize,
    /// Where the previous log was moved
    pub backup: PathBuf,
}

// == Snapshot ==
/// Builds the minimal record set for the cache's live state.
///
/// Records come out least recently used first so replaying them rebuilds
/// the same recency order. Remaining TTLs are rounded up to whole seconds.
/// Returns the records and the number of expired entries omitted.
pub(crate) fn snapshot_records(cache: &LruCache, now_ms: u64) -> (Vec<LogRecord>, usize) {
    let timestamp = now_ms as f64 / 1000.0;
    let mut records = Vec::with_capacity(cache.len());
    let mut expired = 0;

    for key in cache.all_keys() {
        let Some((value, expires_at)) = cache.get_raw(&key) else {
            continue;
        };
        let ttl = match expires_at {
            Some(deadline) if deadline <= now_ms => {
                expired += 1;
                continue;
            }
            Some(deadline) => Some((deadline - now_ms).div_ceil(1000)),
            None => None,
        };
        records.push(LogRecord::set_at(timestamp, key.as_str(), value, ttl));
    }

    (records, expired)
}

// == Compact ==
/// Runs one compaction pass. The caller must hold the store lock.
///
/// Returns `Ok(None)` when there is no log file to compact. If the swap
/// fails the existing log is left in place and statistics are untouched.
pub(crate) async fn compact(
    cache: &LruCache,
    wal: &WriteAheadLog,
    stats: &mut StoreStats,
) -> Result<Option<CompactionReport>> {
    if !wal.exists().await? {
        debug!(path = %wal.path().display(), "no log file, skipping compaction");
        return Ok(None);
    }

    info!("Starting log compaction");

    let (records, expired) = snapshot_records(cache, current_timestamp_ms());
    let swap = wal.replace_with(&records).await?;
    let new_size = settled_size(wal.count_lines().await, swap.lines);

    let old_size = stats.log_size;
    stats.record_compaction(new_size);

    info!(
        old_size,
        new_size,
        expired,
        backup = %swap.backup.display(),
        "Log compaction completed: {} -> {} entries",
        old_size,
        new_size
    );

    Ok(Some(CompactionReport {
        old_size,
        new_size,
        expired,
        backup: swap.backup,
    }))
}

/// Line count to record once the swap has happened. A failed recount falls
/// back to the number of records written, so the completed swap is still
/// reflected in the stats.
fn settled_size(counted: Result<usize>, written: usize) -> usize {
    match counted {
        Ok(lines) => lines,
        Err(e) => {
            warn!(error = %e, "could not recount compacted log, using written line count");
            written
        }
    }
}
