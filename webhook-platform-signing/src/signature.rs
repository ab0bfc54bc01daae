//! Webhook signature generation and verification

use crate::{Clock, Result, SignedToken, SystemClock, WebhookError};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Default maximum drift between token timestamp and verifier clock (5 minutes)
pub use webhook_platform_config::DEFAULT_TOLERANCE_MS;

/// Signs and verifies payloads with one shared secret.
///
/// The signed message is `"{timestamp}.{payload}"` and the digest is
/// HMAC-SHA256 rendered as lowercase hex.
#[derive(Clone)]
pub struct WebhookSignature {
    secret: String,
    clock: Arc<dyn Clock>,
}

impl WebhookSignature {
    /// Create a new signature utility with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for signing timestamps and drift checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to this signer's clock
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Sign a payload at the current time
    pub fn sign(&self, payload: &[u8]) -> SignedToken {
        self.sign_at(payload, self.clock.now_millis())
    }

    /// Sign a payload with a specific timestamp in milliseconds
    pub fn sign_at(&self, payload: &[u8], timestamp_ms: i64) -> SignedToken {
        let timestamp = timestamp_ms.to_string();
        let digest = self.digest(&timestamp, payload);
        SignedToken::new(timestamp, digest)
    }

    /// Verify a signature header value against the payload.
    ///
    /// Returns `Ok(true)` when valid; every failure is an error:
    /// - `InvalidSignature` for an empty, malformed or mismatching token
    /// - `TimestampExpired` when `|now - t| > tolerance_ms`
    pub fn verify(&self, payload: &[u8], signature: &str, tolerance_ms: i64) -> Result<bool> {
        match self.check(payload, signature, tolerance_ms) {
            Ok(token) => {
                debug!(timestamp = token.timestamp(), "webhook signature verified");
                Ok(true)
            }
            Err(err) => {
                warn!(kind = %err.kind(), reason = %err, "webhook signature rejected");
                Err(err)
            }
        }
    }

    fn check(&self, payload: &[u8], signature: &str, tolerance_ms: i64) -> Result<SignedToken> {
        let token = SignedToken::parse(signature)?;
        let timestamp_ms = token.timestamp_millis()?;

        let now = self.clock.now_millis();
        let drift = now.abs_diff(timestamp_ms);
        let tolerance = u64::try_from(tolerance_ms).unwrap_or(0);
        if drift > tolerance {
            return Err(WebhookError::TimestampExpired);
        }

        // Recompute over the timestamp text exactly as received
        let expected = self.digest(token.timestamp(), payload);
        if !constant_time_eq(&expected, token.digest()) {
            return Err(WebhookError::signature_mismatch());
        }

        Ok(token)
    }

    /// HMAC-SHA256 over `"{timestamp}.{payload}"`, lowercase hex
    fn digest(&self, timestamp: &str, payload: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take any size key");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for WebhookSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSignature")
            .field("secret", &"<redacted>")
            .field("clock", &self.clock)
            .finish()
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Build a signature token for `payload`.
///
/// Uses the current time when `timestamp_ms` is `None`. Deterministic for a
/// fixed timestamp.
pub fn generate_signature(payload: &[u8], secret: &str, timestamp_ms: Option<i64>) -> SignedToken {
    let signer = WebhookSignature::new(secret);
    match timestamp_ms {
        Some(ts) => signer.sign_at(payload, ts),
        None => signer.sign(payload),
    }
}

/// Verify `signature` for `payload` against the wall clock.
///
/// Pass [`DEFAULT_TOLERANCE_MS`] for the standard five minute window.
pub fn verify_signature(
    payload: &[u8],
    signature: &str,
    secret: &str,
    tolerance_ms: i64,
) -> Result<bool> {
    WebhookSignature::new(secret).verify(payload, signature, tolerance_ms)
}
