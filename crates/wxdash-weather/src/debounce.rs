//! Last-input-wins debouncing for type-ahead search.
//!
//! Every call to [`SearchDebouncer::run`] takes a ticket from a shared
//! generation counter. A call only runs its operation if no newer ticket was
//! issued during the quiet period, and only reports its result if no newer
//! ticket was issued while the operation was in flight.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Invalidate every pending and in-flight call.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Schedule `op` behind the quiet period.
    ///
    /// The ticket is taken when `run` is called, not when the returned future
    /// is first polled. Resolves to `None` when a newer call superseded this
    /// one, either before `op` started (it never runs) or before it finished
    /// (its result is dropped).
    pub fn run<F, Fut, T>(&self, op: F) -> impl Future<Output = Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        async move {
            let is_current = || generation.load(Ordering::SeqCst) == ticket;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if !is_current() {
                tracing::trace!(ticket, "debounced call superseded before firing");
                return None;
            }

            let output = op().await;

            if !is_current() {
                tracing::debug!(ticket, "discarding stale result");
                return None;
            }
            Some(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::time::sleep;

    type Calls = Arc<Mutex<Vec<&'static str>>>;

    fn recording(calls: &Calls, query: &'static str) -> impl FnOnce() -> std::future::Ready<&'static str> {
        let calls = Arc::clone(calls);
        move || {
            calls.lock().push(query);
            std::future::ready(query)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_only_last_call() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let calls: Calls = Arc::default();

        let a = tokio::spawn(debouncer.run(recording(&calls, "a")));
        sleep(Duration::from_millis(100)).await;
        let ab = tokio::spawn(debouncer.run(recording(&calls, "ab")));
        sleep(Duration::from_millis(100)).await;
        let abc = tokio::spawn(debouncer.run(recording(&calls, "abc")));

        assert_eq!(a.await.unwrap(), None);
        assert_eq!(ab.await.unwrap(), None);
        assert_eq!(abc.await.unwrap(), Some("abc"));
        assert_eq!(*calls.lock(), vec!["abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_both_run() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let calls: Calls = Arc::default();

        let first = debouncer.run(recording(&calls, "bos")).await;
        let second = debouncer.run(recording(&calls, "boston")).await;

        assert_eq!(first, Some("bos"));
        assert_eq!(second, Some("boston"));
        assert_eq!(*calls.lock(), vec!["bos", "boston"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_does_not_overwrite_newer_input() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let calls: Calls = Arc::default();

        let slow_calls = Arc::clone(&calls);
        let slow = tokio::spawn(debouncer.run(move || async move {
            slow_calls.lock().push("slow");
            sleep(Duration::from_millis(1_000)).await;
            "slow"
        }));

        // The slow call fires at 300ms and is still in flight at 400ms
        sleep(Duration::from_millis(400)).await;
        let fast = tokio::spawn(debouncer.run(recording(&calls, "fast")));

        assert_eq!(fast.await.unwrap(), Some("fast"));
        assert_eq!(slow.await.unwrap(), None);
        assert_eq!(*calls.lock(), vec!["slow", "fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let calls: Calls = Arc::default();

        let pending = tokio::spawn(debouncer.run(recording(&calls, "par")));
        sleep(Duration::from_millis(50)).await;
        debouncer.cancel();

        assert_eq!(pending.await.unwrap(), None);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_zero_delay_runs_immediately() {
        let debouncer = SearchDebouncer::new(Duration::ZERO);
        assert_eq!(debouncer.run(|| async { 7 }).await, Some(7));
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(SearchDebouncer::default().delay(), Duration::from_millis(300));
    }
}
