use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};
use vbridge_core::{MetricsBackend, Outcome, StreamResolution};
use vbridge_model::CommandKind;

/// Wait buckets in seconds; the default request timeout is 180s.
const WAIT_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 180.0];

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    dispatched: IntCounterVec,
    completed: IntCounterVec,
    wait: HistogramVec,
    streams: IntCounterVec,
    orphans: IntCounter,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Register the bridge metrics into an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let dispatched = IntCounterVec::new(
            Opts::new(
                "vbridge_requests_dispatched_total",
                "Requests handed to the worker queue",
            ),
            &["kind"],
        )?;
        let completed = IntCounterVec::new(
            Opts::new(
                "vbridge_requests_completed_total",
                "Requests finished, by outcome",
            ),
            &["kind", "outcome"],
        )?;
        let wait = HistogramVec::new(
            HistogramOpts::new(
                "vbridge_request_wait_seconds",
                "Time spent waiting for the worker's response",
            )
            .buckets(WAIT_BUCKETS.to_vec()),
            &["kind"],
        )?;
        let streams = IntCounterVec::new(
            Opts::new(
                "vbridge_stream_resolutions_total",
                "Device stream lookups, by result",
            ),
            &["resolution"],
        )?;
        let orphans = IntCounter::new(
            "vbridge_orphaned_responses_total",
            "Worker responses that arrived with nobody waiting",
        )?;

        registry.register(Box::new(dispatched.clone()))?;
        registry.register(Box::new(completed.clone()))?;
        registry.register(Box::new(wait.clone()))?;
        registry.register(Box::new(streams.clone()))?;
        registry.register(Box::new(orphans.clone()))?;

        Ok(Self {
            registry,
            dispatched,
            completed,
            wait,
            streams,
            orphans,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format, ready to serve on `/metrics`.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_dispatch(&self, kind: CommandKind) {
        self.dispatched.with_label_values(&[kind.as_str()]).inc();
    }

    fn record_outcome(&self, kind: CommandKind, outcome: Outcome, waited: Option<Duration>) {
        self.completed
            .with_label_values(&[kind.as_str(), outcome.as_label()])
            .inc();
        if let Some(waited) = waited {
            self.wait
                .with_label_values(&[kind.as_str()])
                .observe(waited.as_secs_f64());
        }
    }

    fn record_stream(&self, resolution: StreamResolution) {
        self.streams
            .with_label_values(&[resolution.as_label()])
            .inc();
    }

    fn record_orphan(&self) {
        self.orphans.inc();
    }
}
