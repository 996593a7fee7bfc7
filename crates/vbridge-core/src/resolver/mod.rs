//! Device-backed stream resolution for chat requests.
//!
//! A chat request may point at a local camera with an image URL such as
//! `v4l2:///dev/video0`. Before the request is dispatched the resolver makes
//! sure the stream registry has a stream for that device, reusing an existing
//! one when its source matches exactly.
//!
//! Listing and creating are two separate registry calls. Two requests racing
//! on the same new device can therefore both create a stream; no locking is
//! attempted across them.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};
use vbridge_model::{ChatRequest, StreamId};

use crate::{
    error::CoreError,
    metrics::{MetricsHandle, StreamResolution},
    registry::StreamRegistry,
};

/// URL prefix of a local capture device; the device number follows.
pub const DEVICE_URL_PREFIX: &str = "v4l2:///dev/video";

/// Description given to streams opened for a capture device.
pub const DEVICE_STREAM_LABEL: &str = "v4l2 camera";

/// Device path referenced by `url`, if it is a capture-device URL.
///
/// `v4l2:///dev/video3` gives `/dev/video3`. The digits are kept as written
/// and anything after them is ignored.
pub fn device_path(url: &str) -> Option<String> {
    let rest = url.strip_prefix(DEVICE_URL_PREFIX)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    Some(format!("/dev/video{}", &rest[..digits]))
}

/// First capture device referenced by a user message of `request`.
pub fn find_device(request: &ChatRequest) -> Option<String> {
    request.user_image_urls().find_map(device_path)
}

pub struct StreamResolver {
    registry: Arc<dyn StreamRegistry>,
    metrics: MetricsHandle,
}

impl StreamResolver {
    pub fn new(registry: Arc<dyn StreamRegistry>, metrics: MetricsHandle) -> Self {
        Self { registry, metrics }
    }

    /// Stream serving the device referenced by `request`, opening it if needed.
    ///
    /// `None` when the request references no capture device. The stream is left
    /// open afterwards so later requests for the same device reuse it.
    #[instrument(level = "debug", skip_all)]
    pub async fn resolve(&self, request: &ChatRequest) -> Result<Option<StreamId>, CoreError> {
        let Some(device) = find_device(request) else {
            return Ok(None);
        };
        info!(%device, "found v4l2 device");

        let streams = self
            .registry
            .list_streams()
            .await
            .map_err(CoreError::StreamListFailed)?;

        if let Some(existing) = streams.into_iter().find(|s| s.live_stream_url == device) {
            info!(%device, stream_id = %existing.id, "using existing v4l2 stream");
            self.metrics.record_stream(StreamResolution::Reused);
            return Ok(Some(existing.id));
        }

        debug!(%device, "no stream connected for device, adding one");
        match self.registry.create_stream(&device, DEVICE_STREAM_LABEL).await {
            Ok(stream) => {
                info!(%device, stream_id = %stream.id, "added v4l2 stream");
                self.metrics.record_stream(StreamResolution::Created);
                Ok(Some(stream.id))
            }
            Err(e) => {
                error!(%device, error = %e, "failed to add v4l2 stream");
                self.metrics.record_stream(StreamResolution::Failed);
                Err(CoreError::StreamCreationFailed(e))
            }
        }
    }
}
