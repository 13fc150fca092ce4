//! Zone-change listener registry.
//!
//! Consumers attach on construction and detach on teardown. The registry
//! holds only weak references: it never keeps a listener alive, and a
//! dropped listener is pruned on the next notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Receives a notification after every applied state change.
///
/// Runs inline on the coordinator's connection task, so it must not block.
pub trait ZoneListener: Send + Sync {
    /// Called after zone state changed. Read the new state from the coordinator.
    fn zones_updated(&self);
}

impl<F> ZoneListener for F
where
    F: Fn() + Send + Sync,
{
    fn zones_updated(&self) {
        self()
    }
}

/// Handle returned by [`ListenerRegistry::add`], used to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of weakly-held listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<(ListenerId, Weak<dyn ZoneListener>)>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a listener. The registry does not extend its lifetime.
    pub fn add(&self, listener: &Arc<dyn ZoneListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::downgrade(listener)));
        id
    }

    /// Detaches a listener. Returns `false` if it was not attached.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let len_before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() < len_before
    }

    /// Invokes every live listener once and prunes dropped ones.
    ///
    /// Listeners are collected before invocation so a listener may add or
    /// remove listeners without deadlocking.
    pub fn notify(&self) {
        let live: Vec<Arc<dyn ZoneListener>> = {
            let mut listeners = self.listeners.write();
            listeners.retain(|(_, weak)| weak.strong_count() > 0);
            listeners.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
        };

        for listener in live {
            listener.zones_updated();
        }
    }

    /// Returns the number of attached listeners that are still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    /// Returns true if no live listener is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
