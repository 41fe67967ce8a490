//! Host observer subscriptions tied to mode activation.
//!
//! A mode declares what it needs to observe as a list of [`Interest`]s. The
//! [`SubscriptionList`] subscribes them when the mode activates and drops them when
//! it deactivates, so inactive modes cost the host nothing.

use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;

/// A host property a mode wants updates for, e.g. `"track/volume"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interest {
    pub path: Cow<'static, str>,
}

impl Interest {
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Implemented by the host model to start and stop value observation.
pub trait Observable {
    fn subscribe(&mut self, interest: &Interest) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// The subscriptions a single mode owns.
#[derive(Debug, Default)]
pub struct SubscriptionList {
    interests: Vec<Interest>,
    active: SmallVec<[SubscriptionId; 8]>,
}

impl SubscriptionList {
    pub fn new(interests: Vec<Interest>) -> Self {
        Self {
            interests,
            active: SmallVec::new(),
        }
    }

    /// Takes effect on the next activation.
    pub fn add(&mut self, interest: Interest) {
        if !self.interests.contains(&interest) {
            self.interests.push(interest);
        }
    }

    pub fn interests(&self) -> &[Interest] {
        &self.interests
    }

    pub fn is_subscribed(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn subscribe_all(&mut self, host: &mut dyn Observable) {
        if self.is_subscribed() {
            tracing::warn!(
                "Subscribing {} interests twice, keeping the existing subscriptions",
                self.interests.len()
            );
            return;
        }
        for interest in &self.interests {
            self.active.push(host.subscribe(interest));
        }
    }

    pub fn unsubscribe_all(&mut self, host: &mut dyn Observable) {
        for id in self.active.drain(..) {
            host.unsubscribe(id);
        }
    }
}

impl Drop for SubscriptionList {
    fn drop(&mut self) {
        if !self.active.is_empty() {
            tracing::warn!(
                "Dropping {} live host subscriptions without unsubscribing",
                self.active.len()
            );
        }
    }
}

/// Bookkeeping [`Observable`] for hosts that poll instead of pushing updates.
///
/// It records which interests are live so the host adapter can skip refreshing
/// properties nobody looks at.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    next_id: u64,
    live: HashMap<SubscriptionId, Interest>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_observed(&self, path: &str) -> bool {
        self.live.values().any(|interest| interest.path == path)
    }
}

impl Observable for ObserverRegistry {
    fn subscribe(&mut self, interest: &Interest) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.live.insert(id, interest.clone());
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if self.live.remove(&id).is_none() {
            tracing::debug!("Unsubscribe of unknown subscription {:?}", id);
        }
    }
}
