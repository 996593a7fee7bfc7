//! Prometheus metrics backend for the bridge.
//!
//! [`PrometheusMetrics`] implements [`vbridge_core::MetricsBackend`] over its own
//! [`Registry`]. Exposition over HTTP is left to the binary:
//!
//! ```rust,ignore
//! let families = metrics.gather();
//! let encoder = TextEncoder::new();
//! let mut buffer = vec![];
//! encoder.encode(&families, &mut buffer)?;
//! ```
//!
//! ## Metrics
//! - `vbridge_requests_dispatched_total{kind}` - Counter
//! - `vbridge_requests_completed_total{kind, outcome}` - Counter
//! - `vbridge_request_wait_seconds{kind}` - Histogram
//! - `vbridge_stream_resolutions_total{resolution}` - Counter
//! - `vbridge_orphaned_responses_total` - Counter

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
