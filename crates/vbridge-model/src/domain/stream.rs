use serde::{Deserialize, Serialize};

/// Identifier assigned to a live stream by the stream registry.
pub type StreamId = String;

/// Live stream as reported by the stream registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    pub id: StreamId,
    /// Source of the stream: a network URL or a local device path such as `/dev/video0`.
    pub live_stream_url: String,
    #[serde(default)]
    pub description: String,
}

impl StreamDescriptor {
    pub fn new(
        id: impl Into<StreamId>,
        live_stream_url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            live_stream_url: live_stream_url.into(),
            description: description.into(),
        }
    }
}
