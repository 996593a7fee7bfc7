use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MAX_ALERT_ID_LEN, MAX_ALERT_LEN, MAX_ALERTS_PER_REQUEST, ValidationError};

/// Body of `POST /api/v1/alerts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsRequest {
    pub alerts: Vec<String>,
    #[serde(default)]
    pub id: String,
}

impl AlertsRequest {
    /// Check the size limits of the request.
    ///
    /// Lengths are counted in characters, not bytes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.alerts.len() > MAX_ALERTS_PER_REQUEST {
            return Err(ValidationError::TooManyAlerts {
                count: self.alerts.len(),
                max: MAX_ALERTS_PER_REQUEST,
            });
        }
        for (index, alert) in self.alerts.iter().enumerate() {
            let len = alert.chars().count();
            if len > MAX_ALERT_LEN {
                return Err(ValidationError::AlertTooLong {
                    index,
                    len,
                    max: MAX_ALERT_LEN,
                });
            }
        }
        let len = self.id.chars().count();
        if len > MAX_ALERT_ID_LEN {
            return Err(ValidationError::IdTooLong {
                len,
                max: MAX_ALERT_ID_LEN,
            });
        }
        Ok(())
    }
}

/// Sanitized alert rules keyed by their scan position (`"r0"`, `"r1"`, ...).
///
/// Gaps in the key sequence are expected: a key is only present when the alert
/// at that position survived trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertMap(BTreeMap<String, String>);

impl AlertMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Key used for the alert found at scan position `position`.
    pub fn key_for(position: usize) -> String {
        format!("r{position}")
    }

    /// Store `alert` under the key derived from `position`.
    pub fn insert(&mut self, position: usize, alert: impl Into<String>) {
        self.0.insert(Self::key_for(position), alert.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
