//! Cache Module
//!
//! In-memory LRU cache with per-entry TTL, built on an arena-backed
//! eviction list.

mod entry;
mod list;
mod lru;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, current_timestamp_secs, CacheEntry};
pub use list::{EvictionList, NodeId};
pub use lru::LruCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
