use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use vbridge_core::{RegistryError, StreamRegistry};
use vbridge_model::StreamDescriptor;

use crate::config::HttpRegistryConfig;

const STREAMS_PATH: &str = "/api/v1/live-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamAddRequest<'a> {
    live_stream_url: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamAddResponse {
    id: String,
}

/// Talks to the stream service over HTTP.
///
/// - `GET  {endpoint}/api/v1/live-stream` lists streams
/// - `POST {endpoint}/api/v1/live-stream` with `{liveStreamUrl, description}` adds one and answers `{id}`
pub struct HttpStreamRegistry {
    client: reqwest::Client,
    streams_url: String,
}

impl HttpStreamRegistry {
    pub fn new(cfg: &HttpRegistryConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(unavailable)?;

        Ok(Self {
            client,
            streams_url: format!("{}{}", cfg.endpoint.trim_end_matches('/'), STREAMS_PATH),
        })
    }
}

#[async_trait]
impl StreamRegistry for HttpStreamRegistry {
    async fn list_streams(&self) -> Result<Vec<StreamDescriptor>, RegistryError> {
        debug!(url = %self.streams_url, "listing streams");
        let response = self
            .client
            .get(&self.streams_url)
            .send()
            .await
            .map_err(unavailable)?;

        read_json(response).await
    }

    async fn create_stream(
        &self,
        url: &str,
        description: &str,
    ) -> Result<StreamDescriptor, RegistryError> {
        debug!(url, "adding stream");
        let response = self
            .client
            .post(&self.streams_url)
            .json(&StreamAddRequest {
                live_stream_url: url,
                description,
            })
            .send()
            .await
            .map_err(unavailable)?;

        let added: StreamAddResponse = read_json(response).await?;
        Ok(StreamDescriptor::new(added.id, url, description))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RegistryError> {
    let status = response.status();
    let body = response.text().await.map_err(unavailable)?;

    if !status.is_success() {
        return Err(RegistryError::Rejected(format!("{status}: {body}")));
    }
    serde_json::from_str(&body).map_err(|e| {
        RegistryError::InvalidResponse(format!("failed to parse response: {e}, body: {body}"))
    })
}

fn unavailable(e: reqwest::Error) -> RegistryError {
    RegistryError::Unavailable(e.to_string())
}
