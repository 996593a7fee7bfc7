use std::{sync::Arc, time::Duration};

use vbridge_model::CommandKind;

/// How a dispatched request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Timeout,
    DispatchFailed,
}

impl Outcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Timeout => "timeout",
            Outcome::DispatchFailed => "dispatch_failed",
        }
    }
}

/// What the stream resolver did for a device-backed chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamResolution {
    Reused,
    Created,
    Failed,
}

impl StreamResolution {
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamResolution::Reused => "reused",
            StreamResolution::Created => "created",
            StreamResolution::Failed => "failed",
        }
    }
}

/// Sink for bridge metrics.
///
/// The core only reports events; exposition belongs to the implementation
/// (see the `vbridge-prometheus` crate).
pub trait MetricsBackend: Send + Sync + 'static {
    fn record_dispatch(&self, kind: CommandKind);
    /// `waited` is the time spent waiting for the worker, when a wait happened.
    fn record_outcome(&self, kind: CommandKind, outcome: Outcome, waited: Option<Duration>);
    fn record_stream(&self, resolution: StreamResolution);
    fn record_orphan(&self);
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

/// Backend that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsBackend for NoopMetrics {
    fn record_dispatch(&self, _kind: CommandKind) {}
    fn record_outcome(&self, _kind: CommandKind, _outcome: Outcome, _waited: Option<Duration>) {}
    fn record_stream(&self, _resolution: StreamResolution) {}
    fn record_orphan(&self) {}
}

/// Shared no-op handle.
pub fn noop() -> MetricsHandle {
    Arc::new(NoopMetrics)
}
