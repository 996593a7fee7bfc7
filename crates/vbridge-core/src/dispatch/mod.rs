use std::{sync::Arc, time::SystemTime};

use tracing::{debug, instrument, warn};
use vbridge_model::{CommandKind, Envelope, Payload, RequestId};

use crate::{
    error::CoreError,
    metrics::{MetricsHandle, Outcome},
    queue::WorkQueue,
    tracker::Tracker,
};

/// Turns a command into an [`Envelope`] on the work queue plus a pending entry.
pub struct Dispatcher {
    queue: Arc<dyn WorkQueue>,
    tracker: Tracker,
    metrics: MetricsHandle,
}

impl Dispatcher {
    pub fn new(queue: Arc<dyn WorkQueue>, tracker: Tracker, metrics: MetricsHandle) -> Self {
        Self {
            queue,
            tracker,
            metrics,
        }
    }

    /// Enqueue `payload` for the worker and return the id to wait on.
    ///
    /// The id is registered before the envelope becomes visible to the worker,
    /// so a fast response always finds its entry. If the queue refuses the
    /// envelope the registration is rolled back and no entry is left behind.
    #[instrument(level = "debug", skip(self, payload), fields(kind = %kind))]
    pub fn dispatch(&self, kind: CommandKind, payload: Payload) -> Result<RequestId, CoreError> {
        let submitted_at = SystemTime::now();
        let id = loop {
            let id = RequestId::new();
            match self.tracker.register(id, submitted_at) {
                Ok(()) => break id,
                Err(CoreError::DuplicateRequest(_)) => continue,
                Err(e) => return Err(e),
            }
        };

        let envelope = Envelope::new(kind, payload, id, submitted_at);
        if let Err(e) = self.queue.enqueue(envelope) {
            self.tracker.unregister(&id);
            self.metrics.record_outcome(kind, Outcome::DispatchFailed, None);
            warn!(request_id = %id, error = %e, "work queue rejected envelope");
            return Err(CoreError::DispatchFailed(e));
        }

        self.metrics.record_dispatch(kind);
        debug!(request_id = %id, "envelope enqueued");
        Ok(id)
    }
}
