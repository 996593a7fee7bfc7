use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};
use vbridge_core::Delivery;
use vbridge_model::{AlertsRequest, ChatRequest, Response};

use crate::{error::ApiError, handler::ApiHandler};

/// Long-poll wait when the worker does not ask for one.
const DEFAULT_WAIT_MS: u64 = 1_000;
/// Upper bound on a single long-poll.
const MAX_WAIT_MS: u64 = 30_000;

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST /api/v1/alerts - Replace alert rules
    /// - POST /api/v1/chat/completions - Chat/vision query
    /// - GET /api/v1/models - Model listing
    /// - GET /api/v1/live-stream - Known streams
    /// - GET /api/v1/health/live, /api/v1/health/ready - Probes
    /// - GET /internal/v1/commands/next - Worker long-poll
    /// - POST /internal/v1/responses - Worker response delivery
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/alerts", post(submit_alerts::<H>))
            .route("/api/v1/chat/completions", post(chat_completion::<H>))
            .route("/api/v1/models", get(list_models::<H>))
            .route("/api/v1/live-stream", get(list_streams::<H>))
            .route("/api/v1/health/live", get(live))
            .route("/api/v1/health/ready", get(ready::<H>))
            .route("/internal/v1/commands/next", get(next_command::<H>))
            .route("/internal/v1/responses", post(deliver_response::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct DetailResponse<T> {
    detail: T,
}

#[derive(Debug, Deserialize)]
struct NextCommandParams {
    wait_ms: Option<u64>,
}

impl NextCommandParams {
    fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms.unwrap_or(DEFAULT_WAIT_MS).min(MAX_WAIT_MS))
    }
}

fn rejected(e: impl std::fmt::Display) -> ApiError {
    ApiError::InvalidRequest(e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/alerts
async fn submit_alerts<H>(
    State(handler): State<Arc<H>>,
    req: Result<Json<AlertsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let Json(req) = req.map_err(|e| rejected(e.body_text()))?;
    req.validate()?;

    debug!(count = req.alerts.len(), alerts_id = %req.id, "submitting alerts");
    let detail = handler.submit_alerts(req).await?;

    Ok(Json(DetailResponse { detail }))
}

/// POST /api/v1/chat/completions
async fn chat_completion<H>(
    State(handler): State<Arc<H>>,
    req: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let Json(req) = req.map_err(|e| rejected(e.body_text()))?;

    debug!(messages = req.messages.len(), "chat completion");
    let payload = handler.chat_completion(req).await?;

    Ok(Json(payload))
}

/// GET /api/v1/models
async fn list_models<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_models().await?))
}

/// GET /api/v1/live-stream
async fn list_streams<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_streams().await?))
}

/// GET /api/v1/health/live
async fn live() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /api/v1/health/ready
async fn ready<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.ready().await?;
    Ok(Json(json!({ "status": "ready" })))
}

/// GET /internal/v1/commands/next
///
/// Query params:
/// - ?wait_ms=1000 - how long to wait for work (default 1000, max 30000)
async fn next_command<H>(
    State(handler): State<Arc<H>>,
    params: Result<Query<NextCommandParams>, QueryRejection>,
) -> Result<axum::response::Response, ApiError>
where
    H: ApiHandler,
{
    let Query(params) = params.map_err(|e| rejected(e.body_text()))?;

    match handler.next_command(params.wait()).await? {
        Some(envelope) => {
            trace!(request_id = %envelope.id, kind = %envelope.kind, "handing command to worker");
            Ok(Json(envelope).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// POST /internal/v1/responses
async fn deliver_response<H>(
    State(handler): State<Arc<H>>,
    req: Result<Json<Response>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let Json(response) = req.map_err(|e| rejected(e.body_text()))?;
    let id = response.id;

    let delivery = handler.deliver_response(response).await?;
    if delivery == Delivery::Orphaned {
        debug!(request_id = %id, "response had no waiter, dropped");
    }

    Ok(StatusCode::ACCEPTED)
}
