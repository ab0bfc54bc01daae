//! Webhook Signing for the Webhook Platform
//!
//! Signs outgoing webhook payloads and verifies inbound ones so a receiver can
//! trust that a body came from the sender holding the shared secret, was not
//! tampered with, and is fresh.
//!
//! # Wire format
//!
//! - `X-Signature: t=<unix-ms>,v1=<hex hmac-sha256>`
//! - the HMAC input is `"{t}.{raw body}"`, byte for byte
//! - `X-Timestamp`, `X-Event-Id`, `X-Delivery-Id` carry correlation data
//!
//! Tokens older or newer than the tolerance window (five minutes by default)
//! are rejected. There is no replay cache: a captured token stays valid for
//! the whole window.
//!
//! # Example: Signing
//!
//! ```rust
//! use webhook_platform_signing::generate_signature;
//!
//! let token = generate_signature(br#"{"type":"order.completed"}"#, "whsec_abc", Some(1700000000000));
//! assert!(token.to_string().starts_with("t=1700000000000,v1="));
//! ```
//!
//! # Example: Receiving Webhooks
//!
//! ```rust,no_run
//! use webhook_platform_signing::WebhookReceiver;
//!
//! let receiver = WebhookReceiver::new("whsec_abc");
//!
//! let body = br#"{"type":"order.completed","data":{"orderId":"12345"}}"#;
//! let headers = [
//!     ("X-Signature", "t=1700000000000,v1=..."),
//!     ("X-Event-Id", "evt_123"),
//! ];
//!
//! match receiver.construct_event(body, headers) {
//!     Ok(event) => println!("{} {}", event.event_type, event.data),
//!     Err(err) => eprintln!("rejected ({}): {}", err.status_code(), err),
//! }
//! ```

mod clock;
mod error;
mod event;
pub mod headers;
pub mod outgoing;
mod ratelimit;
mod receiver;
mod signature;
mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorKind, WebhookError};
pub use event::WebhookEvent;
pub use headers::{HeaderValue, WebhookHeaders};
pub use outgoing::SignedHeaders;
pub use ratelimit::RateLimitInfo;
pub use receiver::{WebhookHandler, WebhookReceiver, construct_event};
pub use signature::{DEFAULT_TOLERANCE_MS, WebhookSignature, generate_signature, verify_signature};
pub use token::SignedToken;

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;
