//! # Correlation Engine
//!
//! [`Correlator`] turns a fire-and-forget request event into a single
//! awaitable outcome. It owns the two pieces of shared state one bus wiring
//! needs — the [`ListenerRegistry`] and the write-once [`ActiveSuffixes`] —
//! and hands both to the interception stage it produces.
//!
//! ## Implementation Details
//!
//! [`Correlator::dispatch_async`] bridges the asynchronous bus and the
//! awaitable result with a Tokio oneshot channel: a listener is registered
//! that watches every fanned-out event, and when one matches the request's
//! success/failure/cancel form it sends the outcome through the channel and
//! removes its own registry entry. Registration strictly precedes the
//! dispatch call, so even a result event emitted synchronously during
//! dispatch is observed.
//!
//! ## The leak trade-off
//!
//! If no matching lifecycle event ever arrives, the listener is never
//! removed. That is a permanent, unbounded-lifetime entry per unresolved
//! request and the protocol's principal correctness risk: pair every request
//! with a guaranteed eventual lifecycle event, accept the leak, or wrap the
//! call in [`with_timeout`](crate::timeout::with_timeout) (which stops the
//! caller from waiting but does not reclaim the listener).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::event::{Event, Value};
use crate::listener::{ListenerId, ListenerRegistry};
use crate::middleware::CorrelationStage;
use crate::suffix::{ActiveSuffixes, SuffixConfig, SuffixKind};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request was concluded by a failure event. Carries the payload's
    /// error text when the payload was an error value, else a generic
    /// message naming the request's base name.
    #[error("{0}")]
    Failed(String),

    /// The request was concluded by a cancel event.
    #[error("request canceled: {0}")]
    Canceled(String),

    /// The dispatched event's type does not end with the request suffix.
    #[error("event is not a request: {0}")]
    NotARequest(String),

    /// The timeout race elapsed before the correlation settled.
    #[error("request timed out after {after:?} (attempt {attempt})")]
    TimedOut { after: Duration, attempt: u64 },

    /// The settlement channel closed without a value. Not reachable through
    /// normal operation: the sending side lives in the registry until it
    /// settles.
    #[error("correlation channel closed")]
    ChannelClosed,
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Correlation engine for one bus wiring.
///
/// One `Correlator` is shared between the interception stage inserted into
/// the bus pipeline and every `dispatch_async` caller, so all of them see
/// the same listener registry and suffix configuration. Create a fresh one
/// per bus (or per test) rather than holding a process-wide instance.
///
/// ## Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use reqrelay::{Correlator, Event};
///
/// # async fn example(dispatch: impl Fn(Event)) -> Result<(), Box<dyn std::error::Error>> {
/// let correlator = Arc::new(Correlator::new());
/// // wire correlator.stage(None) into the bus pipeline, then:
/// let user = correlator
///     .dispatch_async(dispatch, Event::with_payload("GET_USER_REQUESTED", "1"))
///     .await?;
/// # let _ = user; Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Correlator {
    registry: Arc<ListenerRegistry>,
    suffixes: Arc<ActiveSuffixes>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared listener registry.
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// The suffix configuration currently in effect.
    pub fn suffixes(&self) -> SuffixConfig {
        self.suffixes.get()
    }

    /// Produces the interception stage to insert into the bus pipeline.
    ///
    /// When `config` is `Some`, the stage adopts it on the first event it
    /// sees, provided no configuration has been adopted yet (write-once,
    /// first wins).
    pub fn stage(&self, config: Option<SuffixConfig>) -> CorrelationStage {
        CorrelationStage::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.suffixes),
            config,
        )
    }

    /// Dispatches `request` and awaits the lifecycle event that concludes it.
    ///
    /// Registers a listener keyed to the request's base name, then invokes
    /// `dispatch` — in that order, so no synchronously emitted result can be
    /// missed. The returned future settles at most once:
    ///
    /// - `Ok(payload)` for `<base>_<success>` (payload [`Value::Null`] when absent),
    /// - [`DispatchError::Failed`] for `<base>_<failure>`,
    /// - [`DispatchError::Canceled`] for `<base>_<cancel>` (when configured).
    ///
    /// Events for any other base name never settle it. Base names are plain
    /// strings: two unrelated requests that happen to share one are
    /// indistinguishable to the protocol, and a request whose outcome event
    /// never arrives waits (and stays registered) forever — see the module
    /// docs for the trade-off and the timeout wrapper.
    pub async fn dispatch_async<D>(&self, dispatch: D, request: Event) -> DispatchResult<Value>
    where
        D: FnOnce(Event),
    {
        let suffixes = self.suffixes.get();
        let base = suffixes
            .base_name(&request.event_type)
            .ok_or_else(|| DispatchError::NotARequest(request.event_type.clone()))?
            .to_string();

        // Only the cancel suffix is optional.
        let success_type = suffixes
            .lifecycle_type(&base, SuffixKind::Success)
            .unwrap_or_default();
        let failure_type = suffixes
            .lifecycle_type(&base, SuffixKind::Failure)
            .unwrap_or_default();
        let cancel_type = suffixes.lifecycle_type(&base, SuffixKind::Cancel);

        let (tx, rx) = oneshot::channel::<DispatchResult<Value>>();
        let tx = Mutex::new(Some(tx));
        let id = ListenerId::generate();
        let registry = Arc::clone(&self.registry);

        let watcher = {
            let registry = Arc::clone(&self.registry);
            move |event: &Event| {
                let outcome = if event.event_type == success_type {
                    Some(Ok(event.payload.clone().unwrap_or(Value::Null)))
                } else if event.event_type == failure_type {
                    Some(Err(match &event.payload {
                        Some(Value::Error(message)) => DispatchError::Failed(message.clone()),
                        _ => DispatchError::Failed(format!("request failure: {base}")),
                    }))
                } else if cancel_type.as_deref() == Some(event.event_type.as_str()) {
                    Some(Err(DispatchError::Canceled(base.clone())))
                } else {
                    None
                };

                if let Some(outcome) = outcome {
                    trace!(event_type = %event.event_type, listener = %id, "correlation settled");
                    // Taking the sender out of the Mutex makes the settlement
                    // at-most-once even if a second matching event is fanned
                    // out before the removal below lands.
                    if let Ok(mut guard) = tx.lock() {
                        if let Some(tx) = guard.take() {
                            let _ = tx.send(outcome);
                        }
                    }
                    registry.unregister(id);
                }
            }
        };

        registry.bind(id, watcher);
        debug!(request = %request.event_type, listener = %id, "dispatching request");
        dispatch(request);

        rx.await.unwrap_or(Err(DispatchError::ChannelClosed))
    }
}
