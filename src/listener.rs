//! # Listener Registry
//!
//! Shared storage for the transient listeners that in-flight correlation
//! attempts register. Any number of attempts register concurrently against
//! the same registry; the interception stage fans every recognized event out
//! to all of them and each listener does its own filtering.
//!
//! ## Ownership
//!
//! Every entry is exclusively owned by the attempt that created it: only
//! that attempt removes it, exactly once, at settlement time. The registry
//! itself never expires entries — an attempt whose matching lifecycle event
//! never arrives stays registered for the life of the process (see the
//! crate-level docs on the leak trade-off).

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use crate::event::Event;

/// Callback invoked with every event that passes the interception stage.
pub type ListenerFn = dyn Fn(&Event) + Send + Sync;

/// Opaque identifier for one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registry of currently listening correlation attempts.
///
/// Mutation (register/unregister) and fan-out may interleave freely:
/// [`publish`](Self::publish) snapshots the current entries before invoking
/// any of them, so a listener that unregisters itself (or registers another
/// listener) from inside its own callback cannot corrupt iteration or cause
/// another listener to be invoked twice.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: DashMap<ListenerId, Arc<ListenerFn>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a callback under a fresh identifier and returns the identifier.
    pub fn register(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId::generate();
        self.bind(id, listener);
        id
    }

    /// Stores a callback under a caller-chosen identifier.
    ///
    /// The correlation engine uses this so a listener can capture its own id
    /// and remove itself at settlement time.
    pub(crate) fn bind(&self, id: ListenerId, listener: impl Fn(&Event) + Send + Sync + 'static) {
        self.listeners.insert(id, Arc::new(listener));
    }

    /// Removes the entry for `id`. Idempotent: returns `false` when the
    /// entry was already gone.
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Invokes every currently stored callback with `event`, in unspecified
    /// order.
    ///
    /// A panicking callback is caught and logged; it never aborts fan-out to
    /// the remaining callbacks and never reaches the publisher.
    pub fn publish(&self, event: &Event) {
        let snapshot: Vec<(ListenerId, Arc<ListenerFn>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        for (id, listener) in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(event))) {
                warn!(listener = %id, event_type = %event.event_type,
                    "listener panicked during fan-out: {panic:?}");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
