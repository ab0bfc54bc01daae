// Webhook Platform - signing and verification SDK
//
// This library re-exports the webhook signing crate and the configuration
// crate behind features, plus a prelude for receivers.

#[cfg(feature = "signing")]
pub use webhook_platform_signing as signing;

#[cfg(feature = "config")]
pub use webhook_platform_config as config;

#[cfg(feature = "signing")]
pub use webhook_platform_signing::{
    DEFAULT_TOLERANCE_MS, ErrorKind, Result, SignedToken, WebhookError, WebhookEvent,
    WebhookReceiver, WebhookSignature, construct_event, generate_signature, verify_signature,
};

// Prelude for common imports
pub mod prelude {
    #[cfg(feature = "config")]
    pub use crate::config::{PlatformConfig, ReceiverSettings};

    #[cfg(feature = "signing")]
    pub use crate::signing::{
        Clock, DEFAULT_TOLERANCE_MS, ErrorKind, FixedClock, HeaderValue, RateLimitInfo,
        SignedHeaders, SignedToken, SystemClock, WebhookError, WebhookEvent, WebhookHeaders,
        WebhookReceiver, WebhookSignature, construct_event, generate_signature, verify_signature,
    };

    pub use serde_json::{Value, json};
}
