use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};

use crate::{Payload, RequestId};

/// What the worker is asked to do with an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    /// Replace the worker's active alert rules.
    Alert,
    /// Answer a chat/vision query.
    Query,
}

impl CommandKind {
    /// Short symbolic name, used for logging and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Alert => "alert",
            CommandKind::Query => "query",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work handed from the bridge to the worker.
///
/// Built once by the dispatcher and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub kind: CommandKind,
    pub payload: Payload,
    pub id: RequestId,
    #[serde(with = "crate::domain::time_serde")]
    pub submitted_at: SystemTime,
}

impl Envelope {
    pub fn new(kind: CommandKind, payload: Payload, id: RequestId, submitted_at: SystemTime) -> Self {
        Self {
            kind,
            payload,
            id,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn kind_wire_names() {
        assert_eq!(serde_json::to_string(&CommandKind::Alert).unwrap(), r#""alert""#);
        assert_eq!(serde_json::to_string(&CommandKind::Query).unwrap(), r#""query""#);
    }

    #[test]
    fn envelope_wire_shape() {
        let id = RequestId::new();
        let env = Envelope::new(
            CommandKind::Alert,
            serde_json::json!({"r0": "fire"}),
            id,
            UNIX_EPOCH + Duration::from_millis(1_500),
        );

        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["kind"], "alert");
        assert_eq!(json["payload"]["r0"], "fire");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["submittedAt"], 1.5);

        let back: Envelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn negative_timestamp_is_rejected() {
        let json = serde_json::json!({
            "kind": "query",
            "payload": null,
            "id": RequestId::new(),
            "submittedAt": -1.0,
        });
        assert!(serde_json::from_value::<Envelope>(json).is_err());
    }
}
