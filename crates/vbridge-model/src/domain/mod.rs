mod request_id;
pub use request_id::RequestId;

mod envelope;
pub use envelope::{CommandKind, Envelope};

mod response;
pub use response::Response;

mod stream;
pub use stream::{StreamDescriptor, StreamId};

mod alert;
pub use alert::{AlertMap, AlertsRequest};

mod chat;
pub use chat::{ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent};

mod model_list;
pub use model_list::{ModelCard, ModelList};

mod error;
pub use error::ValidationError;

mod constants;
pub use constants::{MAX_ALERT_ID_LEN, MAX_ALERT_LEN, MAX_ALERTS_PER_REQUEST};

mod time_serde;

/// Opaque request or response body handed through the bridge untouched.
pub type Payload = serde_json::Value;
