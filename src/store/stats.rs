//! Store Statistics Module
//!
//! Tracks hits, misses, evictions, log size and compaction history.
//! Never persisted; every process starts from zero.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Store Stats ==
/// Live counters owned by the store, mutated under its lock.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of successful reads
    pub cache_hits: u64,
    /// Number of reads that found nothing (absent or expired)
    pub cache_misses: u64,
    /// Number of entries evicted for capacity
    pub evictions: u64,
    /// Lines currently in the WAL
    pub log_size: usize,
    /// Completion time of the most recent compaction
    pub last_compaction: Option<DateTime<Utc>>,
    /// Wall-clock start time
    pub start_time: DateTime<Utc>,
    started: Instant,
}

impl StoreStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            cache_hits: 0,
            cache_misses: 0,
            evictions: 0,
            log_size: 0,
            last_compaction: None,
            start_time: Utc::now(),
            started: Instant::now(),
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    // == Recorders ==
    pub fn record_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.cache_misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// One more line appended to the WAL.
    pub fn record_append(&mut self) {
        self.log_size += 1;
    }

    pub fn set_log_size(&mut self, lines: usize) {
        self.log_size = lines;
    }

    /// Marks a finished compaction that left `lines` lines in the WAL.
    pub fn record_compaction(&mut self, lines: usize) {
        self.log_size = lines;
        self.last_compaction = Some(Utc::now());
    }

    /// Seconds since the store was created.
    pub fn uptime_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    // == Snapshot ==
    /// Point-in-time copy for reporting, with the current cache size.
    pub fn snapshot(&self, total_keys: usize) -> StatsSnapshot {
        StatsSnapshot {
            total_keys,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            evictions: self.evictions,
            hit_rate: self.hit_rate(),
            log_size: self.log_size,
            last_compaction: self.last_compaction,
            start_time: self.start_time,
            uptime_seconds: self.uptime_seconds(),
        }
    }
}

impl Default for StoreStats {
    fn default() -> Self {
        Self::new()
    }
}

// == Stats Snapshot ==
/// Serializable statistics returned by `Store::stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_keys: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
    pub log_size: usize,
    pub last_compaction: Option<DateTime<Utc>>,
    pub start_time: DateTime<Utc>,
    pub uptime_seconds: f64,
}
