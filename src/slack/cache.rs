//! Size- and age-bounded key/value cache.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Cache bounded by capacity and entry age.
///
/// Eviction is insertion-ordered: when an insert would exceed capacity, the
/// single oldest-inserted entry is dropped first (not LRU). Expired entries
/// are treated as absent and removed lazily on access.
///
/// Not synchronized; each instance is guarded by its owner's lock, held for
/// the full read-or-populate sequence.
pub struct TtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: HashMap::with_capacity(capacity.min(64)),
            order: VecDeque::new(),
        }
    }

    /// Insert `value` under `key` with expiry `now + ttl`, evicting the
    /// oldest-inserted entry first if the cache is full. Re-adding a key
    /// moves it to the back of the eviction order.
    pub fn add(&mut self, key: K, value: V) {
        if self.entries.remove(&key).is_some() {
            self.order.retain(|k| k != &key);
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Fetch a live entry. Expired entries are removed and reported as
    /// absent; they are never returned.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.expires_at <= Instant::now(),
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }
}
