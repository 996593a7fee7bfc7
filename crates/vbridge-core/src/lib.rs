//! Request/response correlation between the synchronous HTTP surface and the
//! asynchronous worker.
//!
//! The pieces, leaves first:
//! - [`Tracker`]: pending-request bookkeeping and the per-id wait with deadline.
//! - [`Dispatcher`]: builds an [`Envelope`](vbridge_model::Envelope), registers it and enqueues it.
//! - [`StreamResolver`]: finds `v4l2` device references in chat requests and reuses or opens a stream.
//! - [`normalize_alerts`]: bounds and sanitizes a caller's alert list.
//!
//! [`Bridge`] composes them behind the operations the HTTP layer calls.

pub mod error;
pub use error::{CoreError, QueueError, RegistryError};

pub mod queue;
pub use queue::{ChannelQueue, QueueReceiver, WorkQueue};

pub mod tracker;
pub use tracker::{Delivery, Tracker};

pub mod dispatch;
pub use dispatch::Dispatcher;

pub mod registry;
pub use registry::{InMemoryStreamRegistry, StreamRegistry};

pub mod resolver;
pub use resolver::StreamResolver;

pub mod alerts;
pub use alerts::normalize_alerts;

pub mod metrics;
pub use metrics::{MetricsBackend, MetricsHandle, NoopMetrics, Outcome, StreamResolution};

pub mod housekeeping;
pub use housekeeping::spawn_housekeeping;

pub mod bridge;
pub use bridge::{Bridge, BridgeConfig};

#[cfg(test)]
pub(crate) mod testing;
