//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the LRU cache against a simple reference model.

use proptest::prelude::*;
use std::collections::VecDeque;

use crate::cache::LruCache;

// == Strategies ==
/// Keys from a small alphabet so sequences revisit the same keys often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

// == Reference Model ==
/// Naive O(n) LRU: front = most recent.
struct ModelLru {
    capacity: usize,
    order: VecDeque<(String, String)>,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let pos = self.position(key)?;
        let item = self.order.remove(pos)?;
        let value = item.1.clone();
        self.order.push_front(item);
        Some(value)
    }

    fn put(&mut self, key: String, value: String) -> Option<String> {
        if let Some(pos) = self.position(&key) {
            self.order.remove(pos);
            self.order.push_front((key, value));
            return None;
        }
        let evicted = if self.order.len() >= self.capacity {
            self.order.pop_back().map(|(k, _)| k)
        } else {
            None
        };
        self.order.push_front((key, value));
        evicted
    }

    fn delete(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }

    fn keys_oldest_first(&self) -> Vec<String> {
        self.order.iter().rev().map(|(k, _)| k.clone()).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Size never exceeds capacity and index/list stay in bijection after every op.
    #[test]
    fn prop_capacity_and_bijection(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache = LruCache::new(capacity);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => { cache.put(key, value, None); }
                CacheOp::Get { key } => { cache.get(&key); }
                CacheOp::Delete { key } => { cache.delete(&key); }
            }
            prop_assert!(cache.len() <= capacity, "size {} > capacity {}", cache.len(), capacity);
            if let Err(violation) = cache.check_invariants() {
                prop_assert!(false, "invariant violated: {}", violation);
            }
        }
    }

    // The cache agrees with the reference model on every result, every victim
    // and the final recency order.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache = LruCache::new(capacity);
        let mut model = ModelLru::new(capacity);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    let evicted = cache.put(key.clone(), value.clone(), None).map(|e| e.key);
                    prop_assert_eq!(evicted, model.put(key, value));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(cache.delete(&key), model.delete(&key));
                }
            }
        }

        prop_assert_eq!(cache.all_keys(), model.keys_oldest_first());
    }

    // Reading back every key through get_raw never changes eviction order.
    #[test]
    fn prop_get_raw_is_side_effect_free(
        keys in prop::collection::vec(key_strategy(), 2..20),
    ) {
        let mut cache = LruCache::new(4);
        for key in &keys {
            cache.put(key.clone(), format!("value_{}", key), None);
        }
        let before = cache.all_keys();
        for key in &before {
            prop_assert!(cache.get_raw(key).is_some());
        }
        prop_assert_eq!(cache.all_keys(), before);
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_tracks_recency_scenario() {
        let mut model = ModelLru::new(2);
        model.put("a".into(), "1".into());
        model.put("b".into(), "2".into());
        assert_eq!(model.put("c".into(), "3".into()), Some("a".to_string()));
        assert_eq!(model.keys_oldest_first(), vec!["b", "c"]);
    }
}
