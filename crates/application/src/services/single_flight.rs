//! Single-flight deduplication of concurrent fetches
//!
//! Concurrent callers asking for the same cold key share one in-flight
//! future instead of each hitting the providers. The fetch runs as its own
//! task, so it completes even if every caller stops waiting.

use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::Mutex;

/// The shared fetch task ended without producing a value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("in-flight fetch aborted: {0}")]
pub struct FlightAborted(pub String);

type Flight<T> = Shared<BoxFuture<'static, Result<T, FlightAborted>>>;

/// Frees the key when the fetch task finishes, panics included
struct Release<T: Clone> {
    registry: Arc<Mutex<HashMap<String, Flight<T>>>>,
    key: String,
}

impl<T: Clone> Drop for Release<T> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}

/// Map of keys to the fetch currently running for them
pub struct SingleFlight<T: Clone> {
    inflight: Arc<Mutex<HashMap<String, Flight<T>>>>,
}

impl<T: Clone> fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.inflight.lock().len())
            .finish()
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the fetch for `key`, starting it with `start` if none is running
    ///
    /// The key is released once the fetch future resolves, so anything the
    /// future writes before resolving (e.g. a cache entry) is visible to the
    /// next caller.
    pub fn join<F, Fut>(&self, key: &str, start: F) -> Flight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut inflight = self.inflight.lock();
        if let Some(existing) = inflight.get(key) {
            return existing.clone();
        }

        let release = Release {
            registry: Arc::clone(&self.inflight),
            key: key.to_string(),
        };
        let fetch = start();
        let task = tokio::spawn(async move {
            let value = fetch.await;
            drop(release);
            value
        });

        let flight = async move { task.await.map_err(|e| FlightAborted(e.to_string())) }
            .boxed()
            .shared();
        inflight.insert(key.to_string(), flight.clone());
        flight
    }

    /// Number of keys with a fetch in progress
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let flights: SingleFlight<u32> = SingleFlight::new();
        let starts = Arc::new(AtomicUsize::new(0));

        let make = |starts: Arc<AtomicUsize>| {
            move || async move {
                starts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                7
            }
        };

        let a = flights.join("k", make(Arc::clone(&starts)));
        let b = flights.join("k", make(Arc::clone(&starts)));
        assert_eq!(flights.in_flight(), 1);

        let (a, b) = tokio::join!(a, b);
        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn key_is_released_after_completion() {
        let flights: SingleFlight<u32> = SingleFlight::new();
        assert_eq!(flights.join("k", || async { 1 }).await, Ok(1));
        assert_eq!(flights.in_flight(), 0);
        assert_eq!(flights.join("k", || async { 2 }).await, Ok(2));
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let flights: SingleFlight<&'static str> = SingleFlight::new();
        let a = flights.join("a", || async { "a" });
        let b = flights.join("b", || async { "b" });
        assert_eq!(flights.in_flight(), 2);
        assert_eq!(a.await, Ok("a"));
        assert_eq!(b.await, Ok("b"));
    }

    #[tokio::test]
    async fn fetch_completes_when_caller_stops_waiting() {
        let flights: SingleFlight<u32> = SingleFlight::new();
        let done = Arc::new(AtomicUsize::new(0));
        let marker = Arc::clone(&done);
        let flight = flights.join("k", move || async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            marker.fetch_add(1, Ordering::SeqCst);
            3
        });
        drop(flight);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[allow(clippy::panic)]
    async fn explode() -> u32 {
        panic!("fetch blew up")
    }

    #[tokio::test]
    async fn panicking_fetch_reports_abort_and_frees_key() {
        let flights: SingleFlight<u32> = SingleFlight::new();
        let result = flights.join("k", explode).await;
        assert!(result.is_err());
        assert_eq!(flights.in_flight(), 0);
        assert_eq!(flights.join("k", || async { 5 }).await, Ok(5));
    }
}
