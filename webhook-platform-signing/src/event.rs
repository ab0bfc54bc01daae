//! Verified inbound webhook event

use crate::{Result, WebhookError, WebhookHeaders};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A webhook whose signature has been verified.
///
/// Correlation ids come from the request headers; `event_type` and `data`
/// come from the JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// `X-Event-Id`, empty if the sender did not set it
    pub event_id: String,

    /// `X-Delivery-Id`, empty if the sender did not set it
    pub delivery_id: String,

    /// `X-Timestamp` in milliseconds, or the verifier's clock when absent
    pub timestamp: i64,

    /// The body's `type` field, empty if absent
    #[serde(rename = "type")]
    pub event_type: String,

    /// The body's `data` field, or the whole body when there is none
    pub data: Value,
}

impl WebhookEvent {
    /// Assemble the envelope from an already-decoded body
    pub(crate) fn from_parts(body: Value, headers: &WebhookHeaders, now_ms: i64) -> Self {
        let timestamp = headers
            .timestamp()
            .and_then(|raw| match raw.parse::<i64>() {
                Ok(ts) => Some(ts),
                Err(_) => {
                    tracing::debug!(raw, "unparsable X-Timestamp, using verifier clock");
                    None
                }
            })
            .unwrap_or(now_ms);

        let event_type = body
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let data = match body {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        Self {
            event_id: headers.event_id().unwrap_or_default().to_string(),
            delivery_id: headers.delivery_id().unwrap_or_default().to_string(),
            timestamp,
            event_type,
            data,
        }
    }

    /// Deserialize `data` into a typed struct
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            WebhookError::InvalidPayload(format!("Event data has unexpected shape: {}", e))
        })
    }

    /// Match the event type against `*`, `prefix.*` or an exact type
    pub fn matches(&self, filter: &str) -> bool {
        if filter == "*" {
            return true;
        }

        if let Some(prefix) = filter.strip_suffix(".*") {
            return self
                .event_type
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'));
        }

        self.event_type == filter
    }
}
