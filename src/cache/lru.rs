//! LRU Cache Module
//!
//! Hash index over an [`EvictionList`] giving O(1) get, put and delete with
//! bounded capacity and optional per-entry expiry.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::entry::expiry_from_ttl;
use crate::cache::list::{EvictionList, NodeId};
use crate::cache::CacheEntry;

// == LRU Cache ==
/// Capacity-bounded cache evicting the least recently used entry.
///
/// Every key in `index` names exactly one live node in `list` and every node
/// is named by exactly one key.
#[derive(Debug)]
pub struct LruCache {
    capacity: usize,
    index: HashMap<String, NodeId>,
    list: EvictionList<CacheEntry>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");

        Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            list: EvictionList::with_capacity(capacity),
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// An expired entry is removed and reported as absent. That removal is
    /// not an eviction.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let id = *self.index.get(key)?;

        if self.list.get(id).is_some_and(CacheEntry::is_expired) {
            debug!(key = %key, "lazily expiring entry");
            self.remove_node(key, id);
            return None;
        }

        self.list.move_to_front(id);
        self.list.get(id).map(|entry| entry.value.clone())
    }

    // == Put ==
    /// Inserts or replaces `key`.
    ///
    /// An existing key gets its value and expiry replaced and moves to the
    /// front. A new key at full capacity evicts exactly one entry from the
    /// tail, which is returned.
    pub fn put(&mut self, key: String, value: String, ttl: Option<Duration>) -> Option<CacheEntry> {
        self.put_with_deadline(key, value, expiry_from_ttl(ttl))
    }

    /// Like [`put`](Self::put) with an absolute deadline in Unix milliseconds.
    pub fn put_with_deadline(
        &mut self,
        key: String,
        value: String,
        expires_at: Option<u64>,
    ) -> Option<CacheEntry> {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
                entry.expires_at = expires_at;
            }
            self.list.move_to_front(id);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_tail()
        } else {
            None
        };

        let id = self
            .list
            .push_front(CacheEntry::new(key.clone(), value, expires_at));
        self.index.insert(key, id);
        evicted
    }

    // == Delete ==
    /// Removes `key`. Returns true only if a live (unexpired) entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let Some(&id) = self.index.get(key) else {
            return false;
        };
        match self.remove_node(key, id) {
            Some(entry) => !entry.is_expired(),
            None => false,
        }
    }

    // == Inspection ==
    /// Current number of entries, expired-but-unreaped ones included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of every key, least recently used first. No recency side effect.
    pub fn all_keys(&self) -> Vec<String> {
        self.list.iter().rev().map(|entry| entry.key.clone()).collect()
    }

    /// Value and absolute deadline for `key` without touching recency or
    /// reaping expired entries.
    pub fn get_raw(&self, key: &str) -> Option<(&str, Option<u64>)> {
        let id = *self.index.get(key)?;
        self.list
            .get(id)
            .map(|entry| (entry.value.as_str(), entry.expires_at))
    }

    // == Internal ==
    fn evict_tail(&mut self) -> Option<CacheEntry> {
        let entry = self.list.remove_tail()?;
        self.index.remove(&entry.key);
        debug!(key = %entry.key, "evicted least recently used entry");
        Some(entry)
    }

    fn remove_node(&mut self, key: &str, id: NodeId) -> Option<CacheEntry> {
        self.index.remove(key);
        self.list.unlink(id)
    }

    /// Verifies the index/list bijection and the capacity bound.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.index.len() > self.capacity {
            return Err(format!(
                "size {} exceeds capacity {}",
                self.index.len(),
                self.capacity
            ));
        }
        if self.index.len() != self.list.len() {
            return Err(format!(
                "index has {} keys but list has {} nodes",
                self.index.len(),
                self.list.len()
            ));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if &entry.key == key => {}
                Some(entry) => {
                    return Err(format!("key {key} points at node for {}", entry.key));
                }
                None => return Err(format!("key {key} points at an empty node")),
            }
        }
        if self.list.iter().count() != self.list.len() {
            return Err("list traversal disagrees with its length".to_string());
        }
        Ok(())
    }
}
