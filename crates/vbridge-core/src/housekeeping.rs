use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::tracker::{Tracker, saturating_millis};

/// Periodically drop pending entries older than `horizon`.
///
/// Catches entries that were registered but never awaited. Stops when `cancel`
/// fires.
pub fn spawn_housekeeping(
    tracker: Tracker,
    interval: Duration,
    horizon: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(
            interval_ms = saturating_millis(interval),
            horizon_ms = saturating_millis(horizon),
            "housekeeping started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let swept = tracker.sweep(horizon);
                    if swept > 0 {
                        info!(swept, pending = tracker.len(), "expired pending entries removed");
                    }
                }
            }
        }
        debug!("housekeeping stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use vbridge_model::RequestId;

    #[tokio::test(start_paused = true)]
    async fn sweeps_until_cancelled() {
        let tracker = Tracker::new();
        let id = RequestId::new();
        tracker.register(id, SystemTime::now()).unwrap();

        let cancel = CancellationToken::new();
        let handle = spawn_housekeeping(
            tracker.clone(),
            Duration::from_secs(1),
            Duration::from_secs(5),
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(tracker.is_pending(&id));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!tracker.is_pending(&id));

        cancel.cancel();
        handle.await.unwrap();
    }
}
