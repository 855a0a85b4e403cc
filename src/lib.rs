//! # reqrelay: awaitable request/response on a fire-and-forget bus
//!
//! An event bus delivers independent named events to whoever is listening;
//! it has no notion of a request, a response, or the pairing between them.
//! `reqrelay` imposes that pairing as a protocol layered on top: a caller
//! dispatches a `"<base>_REQUESTED"` event and awaits a single outcome, and
//! the event that concludes the request is recognized purely by its name —
//! `"<base>_SUCCEEDED"`, `"<base>_FAILED"`, or `"<base>_CANCELED"`.
//!
//! ## Architecture
//!
//! ```text
//!   caller                           host event bus pipeline
//!     │                                       │
//!     │ dispatch_async(dispatch, request)     │
//!     ├─► register listener ──► [ListenerRegistry] ◄──┐
//!     ├─► dispatch(request) ────────► stage ── fan-out┘
//!     │                                 │ next(event)
//!     │        ... later ...            ▼
//!     │   "<base>_SUCCEEDED" ────► CorrelationStage
//!     │                                 │ fan-out
//!     │◄── oneshot settlement ◄── listener (matches, unregisters)
//!     ▼
//!   Ok(payload) / Err(Failed | Canceled | TimedOut)
//! ```
//!
//! Three pieces cooperate, all shared through one [`Correlator`]:
//!
//! - [`ListenerRegistry`]: shared storage for the transient listeners of
//!   in-flight correlation attempts ([`listener`]).
//! - [`CorrelationStage`]: a middleware stage for the host bus that fans
//!   every recognized lifecycle event out to all listeners and then forwards
//!   the event unchanged ([`middleware`]).
//! - [`Correlator::dispatch_async`]: derives the base name, registers a
//!   listener, triggers the dispatch, and settles exactly once
//!   ([`dispatch`]). [`with_timeout`] optionally bounds the wait
//!   ([`timeout`]).
//!
//! ## Guarantees and non-guarantees
//!
//! - Registration happens before dispatch, so a result event emitted
//!   synchronously during the dispatch call is still observed.
//! - Each attempt settles at most once and removes its own listener at
//!   settlement; events for other base names never settle it.
//! - No ordering across unrelated requests, no deduplication of identical
//!   concurrent requests, no persistence across restarts.
//! - **A request whose lifecycle event never arrives leaks its listener
//!   permanently.** Correlation rests on the naming convention alone; if a
//!   producer never emits the concluding event, nothing removes the entry.
//!   [`with_timeout`] stops the caller from waiting but deliberately does
//!   not reclaim the listener.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use reqrelay::{Correlator, Event, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let correlator = Arc::new(Correlator::new());
//! let stage = Arc::new(correlator.stage(None));
//!
//! // Host pipeline: a handler that answers GET_USER synchronously.
//! let dispatch = {
//!     let stage = Arc::clone(&stage);
//!     move |event: Event| {
//!         let answer = stage.handle(event, &|event| event);
//!         if answer.event_type == "GET_USER_REQUESTED" {
//!             stage.handle(
//!                 Event::with_payload("GET_USER_SUCCEEDED", "Xavier"),
//!                 &|event| event,
//!             );
//!         }
//!     }
//! };
//!
//! let user = correlator
//!     .dispatch_async(dispatch, Event::with_payload("GET_USER_REQUESTED", "1"))
//!     .await
//!     .unwrap();
//! assert_eq!(user, Value::String("Xavier".to_string()));
//! # }
//! ```

pub mod dispatch;
pub mod event;
pub mod listener;
pub mod middleware;
pub mod suffix;
pub mod timeout;

// Re-exports
pub use dispatch::{Correlator, DispatchError, DispatchResult};
pub use event::{Event, Value};
pub use listener::{ListenerId, ListenerRegistry};
pub use middleware::{CorrelationStage, Next};
pub use suffix::{ActiveSuffixes, SuffixConfig, SuffixKind, SEPARATOR};
pub use timeout::with_timeout;
