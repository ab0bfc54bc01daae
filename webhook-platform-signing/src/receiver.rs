//! Webhook receiver for handling incoming webhooks

use crate::{
    Clock, DEFAULT_TOLERANCE_MS, HeaderValue, Result, WebhookError, WebhookEvent, WebhookHeaders,
    WebhookSignature,
};
use std::sync::Arc;
use tracing::debug;
use webhook_platform_config::ReceiverSettings;

/// Receiver for incoming webhooks
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    signature: WebhookSignature,
    tolerance_ms: i64,
}

impl WebhookReceiver {
    /// Create a new receiver with the given secret and a five minute window
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            signature: WebhookSignature::new(secret),
            tolerance_ms: DEFAULT_TOLERANCE_MS,
        }
    }

    /// Create a receiver from loaded settings
    pub fn from_settings(settings: &ReceiverSettings) -> Self {
        Self::new(settings.secret.clone()).with_tolerance_ms(settings.tolerance_ms)
    }

    /// Set the timestamp tolerance in milliseconds
    pub fn with_tolerance_ms(mut self, tolerance_ms: i64) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.signature = self.signature.with_clock(clock);
        self
    }

    pub fn tolerance_ms(&self) -> i64 {
        self.tolerance_ms
    }

    /// Verify an incoming webhook signature
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<bool> {
        self.signature.verify(payload, signature, self.tolerance_ms)
    }

    /// Verify the request and decode it into a [`WebhookEvent`].
    ///
    /// Headers are matched case-insensitively; list-valued headers use their
    /// first element. Fails with `MissingHeader` without `X-Signature`, with
    /// the verifier's error if the signature does not check out, and with
    /// `InvalidPayload` if the verified body is not JSON.
    pub fn construct_event<I, K, V>(&self, payload: &[u8], headers: I) -> Result<WebhookEvent>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<HeaderValue>,
    {
        let headers = WebhookHeaders::normalize(headers);
        self.construct_event_normalized(payload, &headers)
    }

    /// [`construct_event`](Self::construct_event) for an already normalized map
    pub fn construct_event_normalized(
        &self,
        payload: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<WebhookEvent> {
        let signature = headers.signature().ok_or_else(|| {
            tracing::warn!("webhook rejected: no X-Signature header");
            WebhookError::missing_signature_header()
        })?;

        self.verify(payload, signature)?;

        let body: serde_json::Value = serde_json::from_slice(payload)?;
        let event = WebhookEvent::from_parts(body, headers, self.signature.now_millis());

        debug!(
            event_id = %event.event_id,
            delivery_id = %event.delivery_id,
            event_type = %event.event_type,
            "webhook event constructed"
        );
        Ok(event)
    }

    /// Create a handler for specific event types
    pub fn handler<F>(&self, event_filter: &str, callback: F) -> WebhookHandler<F>
    where
        F: Fn(WebhookEvent) -> Result<()>,
    {
        WebhookHandler {
            receiver: self.clone(),
            event_filter: event_filter.to_string(),
            callback,
        }
    }
}

/// Verify `payload` and build an event envelope using the wall clock.
///
/// Pass [`DEFAULT_TOLERANCE_MS`] for the standard five minute window.
pub fn construct_event<I, K, V>(
    payload: &[u8],
    headers: I,
    secret: &str,
    tolerance_ms: i64,
) -> Result<WebhookEvent>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<HeaderValue>,
{
    WebhookReceiver::new(secret)
        .with_tolerance_ms(tolerance_ms)
        .construct_event(payload, headers)
}

/// A webhook handler that filters and processes specific events
pub struct WebhookHandler<F>
where
    F: Fn(WebhookEvent) -> Result<()>,
{
    receiver: WebhookReceiver,
    event_filter: String,
    callback: F,
}

impl<F> WebhookHandler<F>
where
    F: Fn(WebhookEvent) -> Result<()>,
{
    /// Handle an incoming webhook request.
    ///
    /// Returns `Ok(false)` when the verified event does not match the filter.
    pub fn handle<I, K, V>(&self, payload: &[u8], headers: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<HeaderValue>,
    {
        let event = self.receiver.construct_event(payload, headers)?;

        if !event.matches(&self.event_filter) {
            debug!(
                event_type = %event.event_type,
                filter = %self.event_filter,
                "webhook event skipped by filter"
            );
            return Ok(false);
        }

        (self.callback)(event)?;
        Ok(true)
    }

    pub fn event_filter(&self) -> &str {
        &self.event_filter
    }
}
