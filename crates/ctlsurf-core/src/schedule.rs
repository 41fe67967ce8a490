//! Deferred actions polled by the surface tick.

use std::time::{Duration, Instant};

struct Pending<K, A> {
    key: K,
    due: Instant,
    action: A,
}

/// "Run after N ms" without timers or threads.
///
/// The tick calls [`poll`](Self::poll) with the current time and runs whatever is
/// due. Scheduling under a key that is already pending replaces the earlier entry.
pub struct DelayedActionQueue<K, A> {
    pending: Vec<Pending<K, A>>,
}

impl<K: PartialEq, A> DelayedActionQueue<K, A> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, key: K, delay: Duration, now: Instant, action: A) {
        let due = now + delay;
        if let Some(entry) = self.pending.iter_mut().find(|entry| entry.key == key) {
            entry.due = due;
            entry.action = action;
            return;
        }
        self.pending.push(Pending { key, due, action });
    }

    /// Returns whether an entry was pending under `key`.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.key != *key);
        before != self.pending.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.iter().any(|entry| entry.key == *key)
    }

    /// Remove and return all due actions, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<A> {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<K: PartialEq, A> Default for DelayedActionQueue<K, A> {
    fn default() -> Self {
        Self::new()
    }
}
