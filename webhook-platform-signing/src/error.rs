//! Error types for webhook signing, verification and API responses

use crate::RateLimitInfo;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub(crate) const MISSING_SIGNATURE: &str = "Missing signature header";
pub(crate) const INVALID_FORMAT: &str =
    "Invalid signature format. Expected: t=timestamp,v1=signature";
pub(crate) const SIGNATURE_MISMATCH: &str = "Invalid signature";
pub(crate) const MISSING_SIGNATURE_HEADER: &str = "Missing X-Signature header";
pub(crate) const INVALID_JSON: &str = "Invalid JSON payload";

/// Default retry window applied to a 429 response without rate-limit headers
const DEFAULT_RATE_LIMIT_RESET_MS: i64 = 60_000;

/// Errors produced while signing, verifying or interpreting webhook traffic.
///
/// The `Display` output is the human-readable message. Callers should branch
/// on [`WebhookError::kind`] rather than on the text. Messages never contain
/// the secret or any digest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WebhookError {
    /// Signature missing, malformed or not matching the payload
    #[error("{0}")]
    InvalidSignature(String),

    /// Signature timestamp outside the tolerance window
    #[error("Webhook timestamp is outside tolerance window")]
    TimestampExpired,

    /// A required request header is absent
    #[error("{0}")]
    MissingHeader(String),

    /// Payload is not valid JSON (signature already verified)
    #[error("{0}")]
    InvalidPayload(String),

    /// API rejected the API key (HTTP 401)
    #[error("{0}")]
    Authentication(String),

    /// API resource not found (HTTP 404)
    #[error("{0}")]
    NotFound(String),

    /// API rate limit exceeded (HTTP 429)
    #[error("{message}")]
    RateLimited { message: String, info: RateLimitInfo },

    /// API request failed validation (HTTP 400)
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    /// Any other API error status
    #[error("{message}")]
    Api { status: u16, message: String },
}

/// Machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSignature,
    TimestampExpired,
    MissingHeader,
    InvalidPayload,
    Authentication,
    NotFound,
    RateLimited,
    Validation,
    Api,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidSignature => "invalid_signature",
            Self::TimestampExpired => "timestamp_expired",
            Self::MissingHeader => "missing_header",
            Self::InvalidPayload => "invalid_payload",
            Self::Authentication => "authentication",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Validation => "validation",
            Self::Api => "api",
        };
        f.write_str(name)
    }
}

impl WebhookError {
    pub(crate) fn missing_signature() -> Self {
        Self::InvalidSignature(MISSING_SIGNATURE.to_string())
    }

    pub(crate) fn invalid_format() -> Self {
        Self::InvalidSignature(INVALID_FORMAT.to_string())
    }

    pub(crate) fn signature_mismatch() -> Self {
        Self::InvalidSignature(SIGNATURE_MISMATCH.to_string())
    }

    pub(crate) fn missing_signature_header() -> Self {
        Self::MissingHeader(MISSING_SIGNATURE_HEADER.to_string())
    }

    pub(crate) fn invalid_json() -> Self {
        Self::InvalidPayload(INVALID_JSON.to_string())
    }

    /// The error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSignature(_) => ErrorKind::InvalidSignature,
            Self::TimestampExpired => ErrorKind::TimestampExpired,
            Self::MissingHeader(_) => ErrorKind::MissingHeader,
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    /// HTTP status a receiver should answer with, or the API status that caused it
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidSignature(_)
            | Self::TimestampExpired
            | Self::MissingHeader(_)
            | Self::InvalidPayload(_)
            | Self::Validation { .. } => 400,
            Self::Authentication(_) => 401,
            Self::NotFound(_) => 404,
            Self::RateLimited { .. } => 429,
            Self::Api { status, .. } => *status,
        }
    }

    /// Stable wire code, e.g. `invalid_signature`
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSignature(_) => Some("invalid_signature"),
            Self::TimestampExpired => Some("timestamp_expired"),
            Self::MissingHeader(_) => Some("missing_header"),
            Self::InvalidPayload(_) => Some("invalid_payload"),
            Self::Authentication(_) => Some("authentication_error"),
            Self::NotFound(_) => Some("not_found"),
            Self::RateLimited { .. } => Some("rate_limit_exceeded"),
            Self::Validation { .. } => Some("validation_error"),
            Self::Api { .. } => None,
        }
    }

    /// Rate-limit details for a 429
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        match self {
            Self::RateLimited { info, .. } => Some(info),
            _ => None,
        }
    }

    /// Per-field validation messages for a 400
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Map an error response from the platform API onto the taxonomy.
    ///
    /// `body` is the decoded JSON body (`Value::Null` if there was none).
    /// `rate_limit` comes from [`RateLimitInfo::from_headers`]; a 429 without
    /// it gets an empty allowance resetting one minute after `now_ms`.
    pub fn from_api_response(
        status: u16,
        body: &Value,
        rate_limit: Option<RateLimitInfo>,
        now_ms: i64,
    ) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();

        match status {
            401 => Self::Authentication(message),
            404 => Self::NotFound(message),
            429 => Self::RateLimited {
                message,
                info: rate_limit.unwrap_or(RateLimitInfo {
                    limit: 0,
                    remaining: 0,
                    reset: now_ms.saturating_add(DEFAULT_RATE_LIMIT_RESET_MS),
                }),
            },
            400 => Self::Validation {
                message,
                field_errors: field_errors(body.get("fieldErrors")),
            },
            _ => Self::Api { status, message },
        }
    }
}

fn field_errors(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };
    map.iter()
        .map(|(field, message)| {
            let message = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (field.clone(), message)
        })
        .collect()
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(error = %err, "payload is not valid JSON");
        WebhookError::invalid_json()
    }
}
