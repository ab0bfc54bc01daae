//! Headers a sender attaches to a signed webhook before dispatch

use crate::{SignedToken, WebhookSignature};
use std::collections::HashMap;
use uuid::Uuid;

/// Canonical (display-cased) header names on the wire
pub mod wire {
    pub const SIGNATURE: &str = "X-Signature";
    pub const TIMESTAMP: &str = "X-Timestamp";
    pub const EVENT_ID: &str = "X-Event-Id";
    pub const DELIVERY_ID: &str = "X-Delivery-Id";
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// Signature and correlation headers for one delivery.
///
/// `X-Timestamp` always equals the timestamp inside the signature token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub signature: SignedToken,
    pub timestamp: i64,
    pub event_id: String,
    pub delivery_id: String,
}

impl SignedHeaders {
    /// Sign `payload` now, generating `evt_`/`dlv_` ids
    pub fn build(payload: &[u8], signer: &WebhookSignature) -> Self {
        Self::with_ids(
            payload,
            signer,
            format!("evt_{}", Uuid::new_v4().simple()),
            format!("dlv_{}", Uuid::new_v4().simple()),
        )
    }

    /// Sign `payload` now with caller-provided ids
    pub fn with_ids(
        payload: &[u8],
        signer: &WebhookSignature,
        event_id: impl Into<String>,
        delivery_id: impl Into<String>,
    ) -> Self {
        let timestamp = signer.now_millis();
        let signature = signer.sign_at(payload, timestamp);
        let headers = Self {
            signature,
            timestamp,
            event_id: event_id.into(),
            delivery_id: delivery_id.into(),
        };
        tracing::debug!(
            event_id = %headers.event_id,
            delivery_id = %headers.delivery_id,
            timestamp,
            "signed outgoing webhook"
        );
        headers
    }

    /// Header name/value pairs, JSON content type included
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (wire::CONTENT_TYPE, "application/json".to_string()),
            (wire::SIGNATURE, self.signature.to_string()),
            (wire::TIMESTAMP, self.timestamp.to_string()),
            (wire::EVENT_ID, self.event_id.clone()),
            (wire::DELIVERY_ID, self.delivery_id.clone()),
        ]
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.to_pairs()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}
