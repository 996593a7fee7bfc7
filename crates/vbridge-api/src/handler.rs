use std::time::Duration;

use async_trait::async_trait;
use vbridge_core::Delivery;
use vbridge_model::{
    AlertsRequest, ChatRequest, Envelope, ModelList, Payload, Response, StreamDescriptor,
};

use crate::error::ApiError;

/// Backend behind the HTTP routes.
///
/// [`BridgeApiAdapter`](crate::BridgeApiAdapter) is the stock implementation;
/// wrap or replace it to add auth, rate limiting and the like.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Replace the worker's alert rules; answers the worker's payload.
    async fn submit_alerts(&self, request: AlertsRequest) -> Result<Payload, ApiError>;

    /// Run a chat/vision query; answers the worker's payload.
    async fn chat_completion(&self, request: ChatRequest) -> Result<Payload, ApiError>;

    async fn list_models(&self) -> Result<ModelList, ApiError>;

    async fn list_streams(&self) -> Result<Vec<StreamDescriptor>, ApiError>;

    /// Next envelope for the worker, or `None` if nothing arrived within `wait`.
    async fn next_command(&self, wait: Duration) -> Result<Option<Envelope>, ApiError>;

    /// Hand a worker response to whoever is waiting for it.
    async fn deliver_response(&self, response: Response) -> Result<Delivery, ApiError>;

    /// Readiness probe.
    async fn ready(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
