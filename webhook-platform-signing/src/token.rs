//! The `t=<timestamp>,v1=<digest>` signature token

use crate::{Result, WebhookError};
use std::fmt;
use std::str::FromStr;

/// A parsed or freshly generated signature token.
///
/// The timestamp is kept exactly as it appeared on the wire so the digest can
/// be recomputed over the same bytes the sender signed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedToken {
    timestamp: String,
    digest: String,
}

impl SignedToken {
    pub(crate) fn new(timestamp: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            digest: digest.into(),
        }
    }

    /// Parse a signature header value.
    ///
    /// Fields are comma separated and may come in any order. Unknown fields
    /// are ignored; if a field repeats, the last occurrence wins.
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(WebhookError::missing_signature());
        }

        let mut timestamp = None;
        let mut digest = None;
        for part in value.split(',') {
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(v1) = part.strip_prefix("v1=") {
                digest = Some(v1);
            }
        }

        match (timestamp, digest) {
            (Some(t), Some(v1)) => Ok(Self::new(t, v1)),
            _ => Err(WebhookError::invalid_format()),
        }
    }

    /// Timestamp exactly as carried by the token
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Hex digest as carried by the token
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Timestamp in Unix milliseconds
    pub fn timestamp_millis(&self) -> Result<i64> {
        self.timestamp
            .parse()
            .map_err(|_| WebhookError::invalid_format())
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={},v1={}", self.timestamp, self.digest)
    }
}

impl FromStr for SignedToken {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let token = SignedToken::parse("t=1700000000000,v1=abc123").unwrap();
        assert_eq!(token.timestamp(), "1700000000000");
        assert_eq!(token.digest(), "abc123");
        assert_eq!(token.timestamp_millis().unwrap(), 1_700_000_000_000);
    }

    #[test]
    fn test_parse_any_order_with_unknown_fields() {
        let token: SignedToken = "v0=legacy,v1=abc123,t=42,foo=bar".parse().unwrap();
        assert_eq!(token.timestamp(), "42");
        assert_eq!(token.digest(), "abc123");
    }

    #[test]
    fn test_parse_empty() {
        let err = SignedToken::parse("").unwrap_err();
        assert_eq!(err.to_string(), "Missing signature header");
    }

    #[test]
    fn test_parse_missing_fields() {
        for value in ["invalid_format", "v1=abc123", "t=1700000000000", "T=1,V1=abc"] {
            let err = SignedToken::parse(value).unwrap_err();
            assert!(
                err.to_string().starts_with("Invalid signature format"),
                "{value}"
            );
        }
    }

    #[test]
    fn test_timestamp_not_numeric() {
        let token = SignedToken::parse("t=yesterday,v1=abc").unwrap();
        assert!(matches!(
            token.timestamp_millis(),
            Err(WebhookError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_display_wire_form() {
        let token = SignedToken::new("1700000000000", "ff00");
        assert_eq!(token.to_string(), "t=1700000000000,v1=ff00");
    }
}
