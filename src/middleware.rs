//! # Bus Interception Stage
//!
//! [`CorrelationStage`] sits in the host bus's middleware chain. For every
//! event passing through it fans the event out to the registered listeners,
//! then forwards the original event unchanged to the next stage. It never
//! swallows, rewrites, or delays an event, and nothing that goes wrong
//! during fan-out (including a panicking listener) reaches the publisher.
//!
//! The host convention mirrored here is the classic
//! `(store) => (next) => (event) => result` chain: the stage is constructed
//! once per pipeline ([`Correlator::stage`](crate::Correlator::stage)) and
//! invoked per event with the continuation as [`Next`].

use std::sync::Arc;

use tracing::{debug, trace};

use crate::event::Event;
use crate::listener::ListenerRegistry;
use crate::suffix::{ActiveSuffixes, SuffixConfig};

/// Continuation to the next stage in the pipeline.
pub type Next<'a> = &'a (dyn Fn(Event) -> Event + Send + Sync);

/// Middleware stage fanning lifecycle events out to correlation listeners.
pub struct CorrelationStage {
    registry: Arc<ListenerRegistry>,
    suffixes: Arc<ActiveSuffixes>,
    config: Option<SuffixConfig>,
}

impl CorrelationStage {
    pub(crate) fn new(
        registry: Arc<ListenerRegistry>,
        suffixes: Arc<ActiveSuffixes>,
        config: Option<SuffixConfig>,
    ) -> Self {
        Self {
            registry,
            suffixes,
            config,
        }
    }

    /// Processes one event.
    ///
    /// 1. If this stage carries a configuration and none has been adopted
    ///    yet, adopt it now (write-once, first stage wins).
    /// 2. If the event type ends with a recognized lifecycle suffix and at
    ///    least one listener is registered, fan it out.
    /// 3. Forward the original event to `next` regardless of 1 and 2.
    pub fn handle(&self, event: Event, next: Next<'_>) -> Event {
        if let Some(config) = &self.config {
            if self.suffixes.adopt(config.clone()) {
                debug!(?config, "adopted suffix configuration");
            }
        }

        let suffixes = self.suffixes.get();
        if suffixes.kind_of(&event.event_type).is_some() && !self.registry.is_empty() {
            trace!(event_type = %event.event_type, listeners = self.registry.len(),
                "fanning out lifecycle event");
            self.registry.publish(&event);
        }

        next(event)
    }
}
