use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tokio::time::Instant;
use tracing::{debug, info, instrument};
use vbridge_model::{
    AlertsRequest, ChatRequest, CommandKind, ModelList, Payload, Response, StreamDescriptor,
};

use crate::{
    alerts::normalize_alerts,
    dispatch::Dispatcher,
    error::CoreError,
    metrics::{self, MetricsHandle, Outcome},
    queue::WorkQueue,
    registry::StreamRegistry,
    resolver::StreamResolver,
    tracker::{Delivery, Tracker},
};

/// Values the bridge needs at construction time.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Model name reported by the models listing.
    pub model: String,
    /// Number of alert positions scanned per request.
    pub max_alerts: usize,
    /// How long a caller waits for the worker before giving up.
    pub request_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            model: "vila".to_string(),
            max_alerts: 10,
            request_timeout: Duration::from_secs(180),
        }
    }
}

/// Synchronous facade over the worker: dispatch, then wait for the matching response.
pub struct Bridge {
    config: BridgeConfig,
    tracker: Tracker,
    dispatcher: Dispatcher,
    resolver: StreamResolver,
    registry: Arc<dyn StreamRegistry>,
    metrics: MetricsHandle,
}

impl Bridge {
    pub fn new(
        config: BridgeConfig,
        queue: Arc<dyn WorkQueue>,
        registry: Arc<dyn StreamRegistry>,
    ) -> Self {
        Self::with_metrics(config, queue, registry, metrics::noop())
    }

    pub fn with_metrics(
        config: BridgeConfig,
        queue: Arc<dyn WorkQueue>,
        registry: Arc<dyn StreamRegistry>,
        metrics: MetricsHandle,
    ) -> Self {
        let tracker = Tracker::new();
        Self {
            dispatcher: Dispatcher::new(queue, tracker.clone(), metrics.clone()),
            resolver: StreamResolver::new(registry.clone(), metrics.clone()),
            tracker,
            registry,
            metrics,
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Pending-request map, shared with housekeeping.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Dispatch `payload` and wait for the worker's answer.
    pub async fn call(&self, kind: CommandKind, payload: Payload) -> Result<Response, CoreError> {
        let id = self.dispatcher.dispatch(kind, payload)?;

        let started = Instant::now();
        let result = self
            .tracker
            .await_response(id, self.config.request_timeout)
            .await;
        let waited = Some(started.elapsed());

        match &result {
            Ok(_) => self.metrics.record_outcome(kind, Outcome::Ok, waited),
            Err(CoreError::RequestTimeout { .. }) => {
                self.metrics.record_outcome(kind, Outcome::Timeout, waited)
            }
            Err(_) => {}
        }
        result
    }

    /// Replace the worker's alert rules.
    #[instrument(level = "debug", skip_all, fields(alerts_id = %request.id))]
    pub async fn alerts(&self, request: &AlertsRequest) -> Result<Response, CoreError> {
        let alerts = normalize_alerts(request.alerts.as_slice(), self.config.max_alerts);
        info!(received = request.alerts.len(), kept = alerts.len(), "alerts normalized");

        let payload = serde_json::to_value(&alerts)?;
        self.call(CommandKind::Alert, payload).await
    }

    /// Run a chat/vision query, opening a device stream first when one is referenced.
    ///
    /// Nothing is dispatched if opening the stream fails.
    pub async fn chat(&self, request: &ChatRequest) -> Result<Response, CoreError> {
        if let Some(stream_id) = self.resolver.resolve(request).await? {
            debug!(%stream_id, "chat request bound to device stream");
        }

        let payload = serde_json::to_value(request)?;
        self.call(CommandKind::Query, payload).await
    }

    /// Single-entry listing of the configured model, stamped with the current time.
    pub fn models(&self) -> ModelList {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        ModelList::single(&self.config.model, created)
    }

    /// Streams currently known to the registry.
    pub async fn live_streams(&self) -> Result<Vec<StreamDescriptor>, CoreError> {
        self.registry
            .list_streams()
            .await
            .map_err(CoreError::StreamListFailed)
    }

    /// Worker entry point for responses.
    pub fn deliver(&self, response: Response) -> Delivery {
        let delivery = self.tracker.deliver(response);
        if delivery == Delivery::Orphaned {
            self.metrics.record_orphan();
        }
        delivery
    }
}
