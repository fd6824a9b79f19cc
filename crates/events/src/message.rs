use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::BusError;

/// A message addressed to a named topic.
///
/// `key` identifies the entity the message is about (brokers may partition on it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub topic: String,
    pub key: String,
    pub published_at: DateTime<Utc>,
    pub payload: JsonValue,
}

impl TopicMessage {
    /// Serialize `payload` into a message stamped with the current time.
    pub fn new<T: Serialize>(
        topic: impl Into<String>,
        key: impl Into<String>,
        payload: &T,
    ) -> Result<Self, BusError> {
        let payload = serde_json::to_value(payload).map_err(|e| BusError::Serialize(e.to_string()))?;
        Ok(Self {
            topic: topic.into(),
            key: key.into(),
            published_at: Utc::now(),
            payload,
        })
    }
}
