use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use vbridge_core::{Bridge, Delivery, QueueReceiver};
use vbridge_model::{
    AlertsRequest, ChatRequest, Envelope, ModelList, Payload, Response, StreamDescriptor,
};

use crate::{error::ApiError, handler::ApiHandler};

/// [`ApiHandler`] that delegates straight to a [`Bridge`].
///
/// `commands` is the worker half of the bridge's queue, drained by the
/// worker-link route.
pub struct BridgeApiAdapter {
    bridge: Arc<Bridge>,
    commands: Arc<QueueReceiver>,
}

impl BridgeApiAdapter {
    pub fn new(bridge: Arc<Bridge>, commands: Arc<QueueReceiver>) -> Self {
        Self { bridge, commands }
    }
}

#[async_trait]
impl ApiHandler for BridgeApiAdapter {
    async fn submit_alerts(&self, request: AlertsRequest) -> Result<Payload, ApiError> {
        let response = self.bridge.alerts(&request).await?;
        Ok(response.payload)
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<Payload, ApiError> {
        let response = self.bridge.chat(&request).await?;
        Ok(response.payload)
    }

    async fn list_models(&self) -> Result<ModelList, ApiError> {
        Ok(self.bridge.models())
    }

    async fn list_streams(&self) -> Result<Vec<StreamDescriptor>, ApiError> {
        self.bridge.live_streams().await.map_err(ApiError::from)
    }

    async fn next_command(&self, wait: Duration) -> Result<Option<Envelope>, ApiError> {
        Ok(self.commands.recv_timeout(wait).await)
    }

    async fn deliver_response(&self, response: Response) -> Result<Delivery, ApiError> {
        Ok(self.bridge.deliver(response))
    }

    async fn ready(&self) -> Result<(), ApiError> {
        self.bridge
            .live_streams()
            .await
            .map(|_| ())
            .map_err(|e| ApiError::NotReady(e.to_string()))
    }
}
