//! Correlation of in-flight requests with worker responses.
//!
//! Every pending id owns a oneshot channel created at registration. The
//! worker-facing side ([`Tracker::deliver`]) sends into it, the caller-facing
//! side ([`Tracker::await_response`]) waits on it with a deadline. Waiters never
//! share a lock across an `.await`, so one slow request cannot hold up another.
//!
//! The pending map is guarded by a single mutex and every claim or removal of
//! an id happens under it: when a response and the deadline race, whichever
//! reaches the lock first decides the outcome.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, SystemTime},
};

use tokio::{sync::oneshot, time::Instant};
use tracing::{debug, trace, warn};
use vbridge_model::{RequestId, Response};

use crate::error::CoreError;

/// What happened to a response handed to [`Tracker::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A pending request took it.
    Claimed,
    /// Nobody is waiting for this id (late, duplicate or unknown); dropped.
    Orphaned,
}

struct PendingEntry {
    submitted_at: SystemTime,
    registered: Instant,
    tx: Option<oneshot::Sender<Response>>,
    rx: Option<oneshot::Receiver<Response>>,
}

/// Shared pending-request map. Cloning yields another handle to the same map.
#[derive(Clone, Default)]
pub struct Tracker {
    inner: Arc<Mutex<HashMap<RequestId, PendingEntry>>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, PendingEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking `id`. A second registration of a pending id is refused.
    pub fn register(&self, id: RequestId, submitted_at: SystemTime) -> Result<(), CoreError> {
        let mut entries = self.lock();
        if entries.contains_key(&id) {
            return Err(CoreError::DuplicateRequest(id));
        }

        let (tx, rx) = oneshot::channel();
        entries.insert(
            id,
            PendingEntry {
                submitted_at,
                registered: Instant::now(),
                tx: Some(tx),
                rx: Some(rx),
            },
        );
        trace!(request_id = %id, "pending entry registered");
        Ok(())
    }

    /// Drop the pending entry for `id`. Returns `true` if one existed.
    pub fn unregister(&self, id: &RequestId) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.lock().contains_key(id)
    }

    /// Submission time recorded for a pending id.
    pub fn submitted_at(&self, id: &RequestId) -> Option<SystemTime> {
        self.lock().get(id).map(|e| e.submitted_at)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Hand a worker response to whoever waits for its id.
    ///
    /// Each pending id accepts one response; anything else is orphaned.
    pub fn deliver(&self, response: Response) -> Delivery {
        let id = response.id;
        let mut entries = self.lock();

        let Some(tx) = entries.get_mut(&id).and_then(|e| e.tx.take()) else {
            debug!(request_id = %id, "dropping orphaned response");
            return Delivery::Orphaned;
        };
        match tx.send(response) {
            Ok(()) => {
                trace!(request_id = %id, "response claimed");
                Delivery::Claimed
            }
            Err(_) => {
                debug!(request_id = %id, "waiter gone, dropping response");
                Delivery::Orphaned
            }
        }
    }

    /// Wait until the response for `id` arrives or `timeout` elapses.
    ///
    /// The pending entry is gone when this returns, whatever the outcome, and
    /// also when the returned future is dropped before completion. Awaiting an
    /// id that is not pending, or one that already has a waiter, fails with
    /// [`CoreError::NotPending`].
    pub async fn await_response(
        &self,
        id: RequestId,
        timeout: Duration,
    ) -> Result<Response, CoreError> {
        let mut rx = self
            .lock()
            .get_mut(&id)
            .and_then(|e| e.rx.take())
            .ok_or(CoreError::NotPending(id))?;
        let _guard = PendingGuard { tracker: self, id };

        let timed_out = || CoreError::RequestTimeout {
            id,
            timeout_ms: saturating_millis(timeout),
        };

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(response)) => Ok(response),
            // Sender dropped: the entry was swept by housekeeping.
            Ok(Err(_)) => {
                warn!(request_id = %id, "pending entry expired while waiting");
                Err(timed_out())
            }
            Err(_) => {
                // Removing the entry closes the door for deliveries; anything
                // that made it in before that still wins.
                self.unregister(&id);
                match rx.try_recv() {
                    Ok(response) => Ok(response),
                    Err(_) => {
                        warn!(
                            request_id = %id,
                            timeout_ms = saturating_millis(timeout),
                            "request timed out waiting for worker response"
                        );
                        Err(timed_out())
                    }
                }
            }
        }
    }

    /// Remove entries registered at least `horizon` ago. Returns how many went.
    ///
    /// A waiter whose entry is swept wakes up with [`CoreError::RequestTimeout`].
    pub fn sweep(&self, horizon: Duration) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.registered) < horizon);
        before - entries.len()
    }
}

/// Whole milliseconds in `d`, clamped to `u64::MAX`.
pub(crate) fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Removes the pending entry when the waiting future finishes or is dropped.
struct PendingGuard<'a> {
    tracker: &'a Tracker,
    id: RequestId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.unregister(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WAIT: Duration = Duration::from_secs(180);

    fn registered(tracker: &Tracker) -> RequestId {
        let id = RequestId::new();
        tracker.register(id, SystemTime::now()).unwrap();
        id
    }

    async fn until_waiting(tracker: &Tracker, id: RequestId) {
        while tracker.lock().get(&id).is_some_and(|e| e.rx.is_some()) {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let tracker = Tracker::new();
        let id = registered(&tracker);
        assert!(matches!(
            tracker.register(id, SystemTime::now()),
            Err(CoreError::DuplicateRequest(dup)) if dup == id
        ));
        assert_eq!(tracker.len(), 1);
    }

    #[tokio::test]
    async fn response_delivered_before_await_is_returned() {
        let tracker = Tracker::new();
        let id = registered(&tracker);

        let delivery = tracker.deliver(Response::new(id, json!("done")));
        assert_eq!(delivery, Delivery::Claimed);

        let response = tracker.await_response(id, WAIT).await.unwrap();
        assert_eq!(response.payload, json!("done"));
        assert!(!tracker.is_pending(&id));
    }

    #[tokio::test]
    async fn response_delivered_while_waiting_is_returned() {
        let tracker = Tracker::new();
        let id = registered(&tracker);

        let worker = tracker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            worker.deliver(Response::new(id, json!({"answer": 42})));
        });

        let response = tracker.await_response(id, WAIT).await.unwrap();
        assert_eq!(response.payload["answer"], 42);
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_removes_entry() {
        let tracker = Tracker::new();
        let id = registered(&tracker);

        let started = Instant::now();
        let err = tracker
            .await_response(id, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::RequestTimeout { id: timed_out, timeout_ms: 5000 } if timed_out == id
        ));
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(!tracker.is_pending(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_is_orphaned() {
        let tracker = Tracker::new();
        let id = registered(&tracker);

        assert!(tracker.await_response(id, Duration::from_secs(1)).await.is_err());
        assert_eq!(
            tracker.deliver(Response::new(id, json!("late"))),
            Delivery::Orphaned
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn unknown_and_duplicate_responses_are_orphaned() {
        let tracker = Tracker::new();
        assert_eq!(
            tracker.deliver(Response::new(RequestId::new(), json!(null))),
            Delivery::Orphaned
        );

        let id = registered(&tracker);
        assert_eq!(tracker.deliver(Response::new(id, json!(1))), Delivery::Claimed);
        assert_eq!(tracker.deliver(Response::new(id, json!(2))), Delivery::Orphaned);
    }

    #[tokio::test]
    async fn awaiting_twice_or_unknown_is_not_pending() {
        let tracker = Tracker::new();
        let unknown = RequestId::new();
        assert!(matches!(
            tracker.await_response(unknown, WAIT).await,
            Err(CoreError::NotPending(_))
        ));

        let id = registered(&tracker);
        tracker.deliver(Response::new(id, json!("once")));
        tracker.await_response(id, WAIT).await.unwrap();
        assert!(matches!(
            tracker.await_response(id, WAIT).await,
            Err(CoreError::NotPending(_))
        ));
    }

    #[tokio::test]
    async fn dropped_waiter_releases_entry() {
        let tracker = Tracker::new();
        let id = registered(&tracker);

        let waiter = tracker.clone();
        let handle = tokio::spawn(async move { waiter.await_response(id, WAIT).await });
        until_waiting(&tracker, id).await;

        handle.abort();
        let _ = handle.await;
        assert!(!tracker.is_pending(&id));
    }

    #[tokio::test]
    async fn waits_are_independent_per_id() {
        let tracker = Tracker::new();
        let slow = registered(&tracker);
        let fast = registered(&tracker);

        let slow_waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.await_response(slow, WAIT).await })
        };

        tracker.deliver(Response::new(fast, json!("fast")));
        let response = tracker.await_response(fast, WAIT).await.unwrap();
        assert_eq!(response.payload, json!("fast"));
        assert!(tracker.is_pending(&slow));

        tracker.deliver(Response::new(slow, json!("slow")));
        let response = slow_waiter.await.unwrap().unwrap();
        assert_eq!(response.payload, json!("slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_expires_old_entries_and_wakes_waiters() {
        let tracker = Tracker::new();
        let old = registered(&tracker);

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.await_response(old, WAIT).await })
        };
        until_waiting(&tracker, old).await;

        tokio::time::advance(Duration::from_secs(60)).await;
        let fresh = registered(&tracker);

        assert_eq!(tracker.sweep(Duration::from_secs(30)), 1);
        assert!(!tracker.is_pending(&old));
        assert!(tracker.is_pending(&fresh));

        assert!(matches!(
            waiter.await.unwrap(),
            Err(CoreError::RequestTimeout { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn delivery_racing_deadline_has_single_winner() {
        let tracker = Tracker::new();
        let deadline = Duration::from_millis(1);
        let (mut claimed, mut expired) = (0, 0);

        for round in 0..1000u64 {
            let id = registered(&tracker);
            let worker = tracker.clone();
            let delay = Duration::from_micros((round % 20) * 100);
            let delivery = tokio::task::spawn_blocking(move || {
                std::thread::sleep(delay);
                worker.deliver(Response::new(id, json!(round)))
            });

            let result = tracker.await_response(id, deadline).await;
            let delivery = delivery.await.unwrap();

            match (delivery, result) {
                (Delivery::Claimed, Ok(response)) => {
                    assert_eq!(response.payload, json!(round));
                    claimed += 1;
                }
                (Delivery::Orphaned, Err(CoreError::RequestTimeout { .. })) => expired += 1,
                (delivery, result) => {
                    panic!("round {round}: inconsistent outcome {delivery:?} / {result:?}")
                }
            }
            assert!(tracker.is_empty(), "round {round} left an entry behind");
        }
        assert_eq!(claimed + expired, 1000);
    }

    #[test]
    fn millis_saturate_instead_of_wrapping() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn keeps_submission_time() {
        let tracker = Tracker::new();
        let id = RequestId::new();
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        tracker.register(id, at).unwrap();
        assert_eq!(tracker.submitted_at(&id), Some(at));
    }
}
