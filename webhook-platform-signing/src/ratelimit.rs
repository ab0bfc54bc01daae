//! Rate-limit metadata returned by the platform API

use crate::WebhookHeaders;
use crate::headers::names;
use serde::{Deserialize, Serialize};

/// Allowance reported through `X-RateLimit-*` response headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    /// Requests allowed per window
    pub limit: u64,

    /// Requests left in the current window
    pub remaining: u64,

    /// Window reset time, Unix milliseconds
    pub reset: i64,
}

impl RateLimitInfo {
    /// Read the three rate-limit headers. All of them must be present and numeric.
    pub fn from_headers(headers: &WebhookHeaders) -> Option<Self> {
        let limit = headers.get(names::RATE_LIMIT_LIMIT)?.trim().parse().ok()?;
        let remaining = headers.get(names::RATE_LIMIT_REMAINING)?.trim().parse().ok()?;
        let reset = headers.get(names::RATE_LIMIT_RESET)?.trim().parse().ok()?;
        Some(Self {
            limit,
            remaining,
            reset,
        })
    }

    /// Milliseconds until the window resets, never negative
    pub fn retry_after_ms(&self, now_ms: i64) -> i64 {
        self.reset.saturating_sub(now_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_headers_any_case() {
        let headers = WebhookHeaders::normalize([
            ("X-RateLimit-Limit", "100"),
            ("x-ratelimit-remaining", " 7 "),
            ("X-RATELIMIT-RESET", "1700000060000"),
        ]);

        let info = RateLimitInfo::from_headers(&headers).unwrap();
        assert_eq!(info.limit, 100);
        assert_eq!(info.remaining, 7);
        assert_eq!(info.reset, 1_700_000_060_000);
    }

    #[test]
    fn test_from_headers_requires_all_three() {
        let headers = WebhookHeaders::normalize([
            ("X-RateLimit-Limit", "100"),
            ("X-RateLimit-Remaining", "0"),
        ]);
        assert!(RateLimitInfo::from_headers(&headers).is_none());

        let headers = WebhookHeaders::normalize([
            ("X-RateLimit-Limit", "lots"),
            ("X-RateLimit-Remaining", "0"),
            ("X-RateLimit-Reset", "0"),
        ]);
        assert!(RateLimitInfo::from_headers(&headers).is_none());
    }

    #[test]
    fn test_retry_after() {
        let info = RateLimitInfo {
            limit: 100,
            remaining: 0,
            reset: 10_000,
        };
        assert_eq!(info.retry_after_ms(4_000), 6_000);
        assert_eq!(info.retry_after_ms(20_000), 0);
    }
}
