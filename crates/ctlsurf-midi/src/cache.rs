//! Last-sent value caches for stateful surface outputs.

use std::collections::HashMap;
use std::hash::Hash;

/// Remembers the last value sent per output so unchanged values are skipped.
#[derive(Debug, Clone)]
pub struct SendCache<K, V> {
    sent: HashMap<K, V>,
}

impl<K: Eq + Hash, V: PartialEq> SendCache<K, V> {
    pub fn new() -> Self {
        Self {
            sent: HashMap::new(),
        }
    }

    /// True, and records `value`, when it differs from what was last sent for `key`.
    pub fn should_send(&mut self, key: K, value: V) -> bool {
        if self.sent.get(&key) == Some(&value) {
            return false;
        }
        self.sent.insert(key, value);
        true
    }

    pub fn last_sent(&self, key: &K) -> Option<&V> {
        self.sent.get(key)
    }

    pub fn invalidate(&mut self, key: &K) {
        self.sent.remove(key);
    }

    /// After a reconnect or mode switch the hardware state is unknown.
    pub fn invalidate_all(&mut self) {
        self.sent.clear();
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for SendCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
