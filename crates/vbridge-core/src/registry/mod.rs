use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;
use vbridge_model::StreamDescriptor;

use crate::error::RegistryError;

/// External service that owns live streams.
///
/// The bridge only lists and creates; removing streams is the registry's business.
#[async_trait]
pub trait StreamRegistry: Send + Sync + 'static {
    async fn list_streams(&self) -> Result<Vec<StreamDescriptor>, RegistryError>;

    async fn create_stream(
        &self,
        url: &str,
        description: &str,
    ) -> Result<StreamDescriptor, RegistryError>;
}

/// Process-local registry; used when no stream service is configured.
#[derive(Default)]
pub struct InMemoryStreamRegistry {
    streams: RwLock<Vec<StreamDescriptor>>,
}

impl InMemoryStreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_streams(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams: RwLock::new(streams),
        }
    }
}

#[async_trait]
impl StreamRegistry for InMemoryStreamRegistry {
    async fn list_streams(&self) -> Result<Vec<StreamDescriptor>, RegistryError> {
        let streams = self.streams.read().unwrap_or_else(PoisonError::into_inner);
        Ok(streams.clone())
    }

    async fn create_stream(
        &self,
        url: &str,
        description: &str,
    ) -> Result<StreamDescriptor, RegistryError> {
        if url.trim().is_empty() {
            return Err(RegistryError::Rejected("stream url cannot be empty".into()));
        }

        let stream = StreamDescriptor::new(uuid::Uuid::new_v4().to_string(), url, description);
        self.streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stream.clone());
        debug!(stream_id = %stream.id, url, "stream registered");
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_streams_are_listed() {
        let registry = InMemoryStreamRegistry::new();
        let created = registry
            .create_stream("/dev/video0", "v4l2 camera")
            .await
            .unwrap();

        let listed = registry.list_streams().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.live_stream_url, "/dev/video0");
        assert_eq!(created.description, "v4l2 camera");
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let registry = InMemoryStreamRegistry::new();
        assert!(matches!(
            registry.create_stream("  ", "x").await,
            Err(RegistryError::Rejected(_))
        ));
    }
}
