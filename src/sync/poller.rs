//! Recurring fetch loop with staleness arbitration.
//!
//! A [`Poller`] owns one remote resource: it dispatches a fetch attempt
//! immediately on start and then on a fixed-rate schedule, folding each
//! settled attempt into a [`ResourceState`]. Because the network may
//! complete attempts out of dispatch order, every attempt is tagged with a
//! sequence number and completions use keep-max semantics: a result only
//! mutates state if no later-dispatched attempt has already settled. The
//! accepted state therefore never regresses to an older snapshot.
//!
//! Failures are folded the same way but only touch `error`; the last known
//! good snapshot stays in place so a consumer can keep rendering stale data
//! instead of a blank view. There is no backoff or retry cap; the poller
//! simply waits for its next scheduled dispatch, forever, until stopped.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::state::ResourceState;

struct Inner<T> {
    state: ResourceState<T>,
    /// Highest sequence number whose completion has been applied.
    applied: u64,
    /// Cleared by `stop`; completions consult this under the lock, so no
    /// settlement after `stop` returns can mutate state.
    active: bool,
}

struct Shared<T> {
    name: String,
    inner: Mutex<Inner<T>>,
    accepted: watch::Sender<Option<T>>,
}

impl<T: Clone> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap()
    }

    /// Fold one settled attempt into the state, or discard it.
    fn complete(&self, sequence: u64, outcome: Result<T, String>) {
        let mut inner = self.lock();
        if !inner.active {
            return;
        }
        if sequence <= inner.applied {
            debug!(
                resource = %self.name,
                sequence,
                applied = inner.applied,
                "discarding stale completion"
            );
            return;
        }
        inner.applied = sequence;
        inner.state.loading = false;

        match outcome {
            Ok(data) => {
                inner.state.data = Some(data.clone());
                inner.state.error = None;
                debug!(resource = %self.name, sequence, "snapshot accepted");
                // Receivers observe accepted snapshots in application order
                // because the send happens under the state lock.
                let _ = self.accepted.send(Some(data));
            }
            Err(message) => {
                warn!(resource = %self.name, sequence, error = %message, "fetch failed");
                inner.state.error = Some(message);
            }
        }
    }
}

/// Recurring fetch loop for one resource.
///
/// Created with [`Poller::start`], which dispatches the first attempt
/// immediately. The poller stops when [`Poller::stop`] is called or when it
/// is dropped; in-flight attempts are not aborted at the transport level
/// (fetches are idempotent reads) but their results are unconditionally
/// discarded after stop.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pulsecheck::Poller;
///
/// # tokio_test::block_on(async {
/// let poller = Poller::start("answer", || async { Ok::<_, String>(42) },
///     Duration::from_secs(5));
///
/// tokio::time::sleep(Duration::from_millis(50)).await;
/// assert_eq!(poller.state().data, Some(42));
/// poller.stop();
/// # });
/// ```
pub struct Poller<T> {
    shared: Arc<Shared<T>>,
    driver: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start polling: dispatch one fetch now, then one every `interval`.
    ///
    /// The schedule is fixed-rate, measured from dispatch time. A fetch that
    /// outlives the interval does not delay the next dispatch; the two run
    /// concurrently and the sequence guard sorts out whichever settles last.
    /// Intervals below one millisecond are raised to one millisecond so the
    /// ticker always has a non-zero period.
    ///
    /// `name` labels the resource in log output.
    pub fn start<F, Fut, E>(name: &str, fetch: F, interval: Duration) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display,
    {
        let (accepted, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            name: name.to_string(),
            inner: Mutex::new(Inner {
                state: ResourceState::new(),
                applied: 0,
                active: true,
            }),
            accepted,
        });

        let driver = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
                loop {
                    ticker.tick().await;

                    // Tag the attempt before the fetch future starts.
                    let sequence = {
                        let mut inner = shared.lock();
                        if !inner.active {
                            break;
                        }
                        inner.state.sequence += 1;
                        inner.state.sequence
                    };

                    let attempt = fetch();
                    let shared = Arc::clone(&shared);
                    tokio::spawn(async move {
                        let outcome = attempt.await.map_err(|e| e.to_string());
                        shared.complete(sequence, outcome);
                    });
                }
            }
        });

        Self { shared, driver }
    }

    /// Stop polling. Idempotent; takes effect before any subsequent
    /// completion can mutate state.
    pub fn stop(&self) {
        let was_active = {
            let mut inner = self.shared.lock();
            std::mem::replace(&mut inner.active, false)
        };
        if was_active {
            debug!(resource = %self.shared.name, "poller stopped");
            self.driver.abort();
        }
    }

    /// Whether the poller is still dispatching attempts.
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    /// The resource name given at start.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// A consistent snapshot of the current resource state.
    pub fn state(&self) -> ResourceState<T> {
        self.shared.lock().state.clone()
    }

    /// The most recent failure message, if the last settled attempt failed.
    pub fn error(&self) -> Option<String> {
        self.shared.lock().state.error.clone()
    }

    /// Subscribe to accepted snapshots.
    ///
    /// The receiver sees every snapshot accepted after subscription (and the
    /// latest one accepted before it); this is how a time-series aggregator
    /// observes a metrics poller.
    pub fn updates(&self) -> watch::Receiver<Option<T>> {
        self.shared.accepted.subscribe()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        let was_active = {
            let mut inner = self.shared.inner.lock().unwrap();
            std::mem::replace(&mut inner.active, false)
        };
        if was_active {
            self.driver.abort();
        }
    }
}

impl<T> fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("name", &self.shared.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fetch that succeeds instantly with the number of calls made so far.
    fn counting_fetch() -> (Arc<AtomicU64>, impl Fn() -> std::future::Ready<Result<u64, String>>) {
        let calls = Arc::new(AtomicU64::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
        };
        (calls, fetch)
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_is_immediate() {
        let (_, fetch) = counting_fetch();
        let poller = Poller::start("test", fetch, Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(10)).await;

        let state = poller.state();
        assert_eq!(state.data, Some(1));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn three_cycles_yield_latest_snapshot() {
        let (calls, fetch) = counting_fetch();
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        // Dispatches at t=0, 5000, 10000.
        tokio::time::sleep(Duration::from_millis(10_100)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let state = poller.state();
        assert_eq!(state.data, Some(3));
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_failure_does_not_overwrite_newer_success() {
        // Attempt #1 takes 6s and fails; attempt #2 (dispatched at 5s)
        // takes 200ms and succeeds. The late failure must be discarded.
        let calls = Arc::new(AtomicU64::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        tokio::time::sleep(Duration::from_millis(6000)).await;
                        Err("connection refused".to_string())
                    } else {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        Ok(9u64)
                    }
                }
            }
        };
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        // Past both settlements (t=5200 success, t=6000 stale failure),
        // before the third dispatch.
        tokio::time::sleep(Duration::from_millis(7000)).await;

        let state = poller.state();
        assert_eq!(state.data, Some(9));
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_success_does_not_overwrite_newer_success() {
        let calls = Arc::new(AtomicU64::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        // Settles at t=6000, after attempt #2 was accepted.
                        tokio::time::sleep(Duration::from_millis(6000)).await;
                    } else {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    }
                    Ok::<_, String>(call)
                }
            }
        };
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        tokio::time::sleep(Duration::from_millis(5300)).await;
        assert_eq!(poller.state().data, Some(2));

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(poller.state().data, Some(2), "stale result must stay discarded");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_preserves_previous_data() {
        let calls = Arc::new(AtomicU64::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        Ok(7u64)
                    } else {
                        Err("metrics-server unavailable".to_string())
                    }
                }
            }
        };
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        tokio::time::sleep(Duration::from_millis(5100)).await;

        let state = poller.state();
        assert_eq!(state.data, Some(7), "stale data preferred over blank");
        assert_eq!(state.error.as_deref(), Some("metrics-server unavailable"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_previous_error() {
        let calls = Arc::new(AtomicU64::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        Err("boom".to_string())
                    } else {
                        Ok(1u64)
                    }
                }
            }
        };
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(poller.error().as_deref(), Some("boom"));
        assert!(!poller.state().loading, "first failure ends loading");

        tokio::time::sleep(Duration::from_millis(5100)).await;
        let state = poller.state();
        assert!(state.error.is_none());
        assert_eq!(state.data, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_completions() {
        let fetch = || async {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            Ok::<_, String>(42u64)
        };
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        // Let the first dispatch happen, then stop before it settles.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(poller.state().sequence, 1);
        poller.stop();
        assert!(!poller.is_active());

        // The in-flight attempt settles well after stop; nothing may change.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let state = poller.state();
        assert!(state.data.is_none());
        assert!(state.loading, "no settlement was applied after stop");
        assert!(state.error.is_none());
        assert_eq!(state.sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_raised_to_a_floor() {
        // A zero period would abort the driver task before any dispatch,
        // leaving the state stuck at loading with no data and no error.
        let (calls, fetch) = counting_fetch();
        let poller = Poller::start("test", fetch, Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(5)).await;

        let state = poller.state();
        assert!(!state.loading, "driver must survive a zero interval");
        assert!(state.data.is_some());
        assert!(state.error.is_none());
        // Dispatches continue at the 1ms floor.
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let (_, fetch) = counting_fetch();
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));

        poller.stop();
        poller.stop();
        assert!(!poller.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_poller_dispatches_no_further_attempts() {
        let (calls, fetch) = counting_fetch();
        let poller = Poller::start("test", fetch, Duration::from_millis(1000));

        tokio::time::sleep(Duration::from_millis(10)).await;
        poller.stop();
        tokio::time::sleep(Duration::from_millis(10_000)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pollers_keep_independent_cadence() {
        let (fast_calls, fast_fetch) = counting_fetch();
        let (slow_calls, slow_fetch) = counting_fetch();
        let fast = Poller::start("fast", fast_fetch, Duration::from_millis(3000));
        let slow = Poller::start("slow", slow_fetch, Duration::from_millis(10_000));

        // t=9100: fast has dispatched at 0, 3000, 6000, 9000; slow at 0.
        tokio::time::sleep(Duration::from_millis(9100)).await;
        assert_eq!(fast_calls.load(Ordering::SeqCst), 4);
        assert_eq!(slow_calls.load(Ordering::SeqCst), 1);

        // Stopping one must not affect the other's timer.
        fast.stop();
        tokio::time::sleep(Duration::from_millis(11_000)).await;
        assert_eq!(fast_calls.load(Ordering::SeqCst), 4);
        assert_eq!(slow_calls.load(Ordering::SeqCst), 3);
        assert_eq!(slow.state().data, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn updates_carry_accepted_snapshots_only() {
        let calls = Arc::new(AtomicU64::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 2 {
                        Err("boom".to_string())
                    } else {
                        Ok(call)
                    }
                }
            }
        };
        let poller = Poller::start("test", fetch, Duration::from_millis(5000));
        let mut rx = poller.updates();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(1));

        // The failed attempt publishes nothing.
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(!rx.has_changed().unwrap());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(*rx.borrow_and_update(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_polling() {
        let (calls, fetch) = counting_fetch();
        {
            let _poller = Poller::start("test", fetch, Duration::from_millis(1000));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
