use std::collections::HashMap;

/// Tiny TTL cache keyed by string. Time is passed in explicitly so tests
/// never sleep; expiry is checked on read and stale entries are dropped.
pub struct TtlCache<V> {
    ttl_secs: u64,
    entries: HashMap<String, (u64, V)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl_secs: u64) -> Self {
        TtlCache {
            ttl_secs,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str, now: u64) -> Option<V> {
        match self.entries.get(key) {
            Some((stored_at, value)) if now.saturating_sub(*stored_at) < self.ttl_secs => {
                Some(value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&mut self, key: &str, value: V, now: u64) {
        self.entries.insert(key.to_string(), (now, value));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
