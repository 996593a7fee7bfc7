use thiserror::Error;
use vbridge_model::RequestId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to dispatch request: {0}")]
    DispatchFailed(#[from] QueueError),

    #[error("request {id} timed out after {timeout_ms}ms")]
    RequestTimeout { id: RequestId, timeout_ms: u64 },

    #[error("failed to add v4l2 stream: {0}")]
    StreamCreationFailed(#[source] RegistryError),

    #[error("failed to list streams: {0}")]
    StreamListFailed(#[source] RegistryError),

    #[error("request {0} is already pending")]
    DuplicateRequest(RequestId),

    #[error("request {0} is not pending")]
    NotPending(RequestId),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outbound work queue refused an envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("work queue is closed")]
    Closed,
    #[error("work queue is full")]
    Full,
}

/// Stream registry call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("stream registry unavailable: {0}")]
    Unavailable(String),
    #[error("stream registry rejected request: {0}")]
    Rejected(String),
    #[error("invalid stream registry response: {0}")]
    InvalidResponse(String),
}
