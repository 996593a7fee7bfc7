use serde::{Deserialize, Serialize};

use crate::{Payload, RequestId};

/// Worker output keyed by the originating request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    pub payload: Payload,
}

impl Response {
    pub fn new(id: RequestId, payload: Payload) -> Self {
        Self { id, payload }
    }
}
