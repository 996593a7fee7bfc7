use serde::{Deserialize, Serialize};

/// Response of `GET /api/v1/models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCard {
    pub id: String,
    pub object: String,
    /// Unix timestamp, seconds.
    pub created: u64,
    pub owned_by: String,
}

impl ModelList {
    /// Listing with exactly one system-owned model.
    pub fn single(model: impl Into<String>, created: u64) -> Self {
        Self {
            object: "list".to_string(),
            data: vec![ModelCard {
                id: model.into(),
                object: "model".to_string(),
                created,
                owned_by: "system".to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_listing_shape() {
        let list = ModelList::single("vila-1.5", 1_700_000_000);
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            serde_json::json!({
                "object": "list",
                "data": [{
                    "id": "vila-1.5",
                    "object": "model",
                    "created": 1_700_000_000u64,
                    "owned_by": "system"
                }]
            })
        );
    }
}
