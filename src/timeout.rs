//! # Timeout Race
//!
//! [`with_timeout`] bounds how long a caller waits on a correlation, not how
//! long the correlation lives. When the timer wins, the underlying listener
//! stays registered and will still settle-and-unregister itself if the
//! matching event eventually arrives; only the caller stops waiting. When
//! the correlation wins, the timer is dropped and never observed.
//!
//! Each invocation takes a fresh monotonically increasing attempt id. The id
//! is carried on the timeout outcome and in trace logs so a binding layer
//! that retriggers the same logical operation can tell attempt *N*'s outcome
//! from attempt *N+1*'s; the race itself is per-invocation by construction,
//! since every call owns its own timer and future.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, trace};

use crate::dispatch::{DispatchError, DispatchResult};

static NEXT_ATTEMPT: AtomicU64 = AtomicU64::new(1);

fn next_attempt() -> u64 {
    NEXT_ATTEMPT.fetch_add(1, Ordering::Relaxed)
}

/// Races `correlation` against a timer of `after`.
///
/// Returns the correlation's own outcome when it settles first, and
/// [`DispatchError::TimedOut`] when the timer fires first. A settlement that
/// happens after the timer has already won is discarded as far as this
/// caller is concerned; the listener behind the correlation still cleans
/// itself up when that settlement occurs.
///
/// ## Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use reqrelay::{with_timeout, Correlator, Event};
///
/// # async fn example(correlator: Correlator, dispatch: impl Fn(Event)) {
/// let outcome = with_timeout(
///     correlator.dispatch_async(dispatch, Event::new("GET_USER_REQUESTED")),
///     Duration::from_secs(5),
/// )
/// .await;
/// # let _ = outcome;
/// # }
/// ```
pub async fn with_timeout<T, F>(correlation: F, after: Duration) -> DispatchResult<T>
where
    F: Future<Output = DispatchResult<T>>,
{
    let attempt = next_attempt();
    let sleep = tokio::time::sleep(after);
    tokio::pin!(sleep);
    tokio::pin!(correlation);

    tokio::select! {
        outcome = &mut correlation => {
            trace!(attempt, "correlation settled before timeout");
            outcome
        }
        _ = &mut sleep => {
            debug!(attempt, ?after, "correlation timed out");
            Err(DispatchError::TimedOut { after, attempt })
        }
    }
}
