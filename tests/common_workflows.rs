//! Integration tests for common webhook workflows.
//!
//! A sender signs a body, a receiver verifies it and builds the event
//! envelope. Every test pins the clock so drift checks are deterministic.

use std::collections::HashMap;
use std::sync::Arc;
use webhook_platform::prelude::*;

const SECRET: &str = "whsec_test_secret_key_123";
const PAYLOAD: &str = r#"{"type":"order.completed","data":{"orderId":"12345"}}"#;
const NOW: i64 = 1_700_000_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn clock(now: i64) -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(now))
}

// =============================================================================
// Signing
// =============================================================================

#[test]
fn test_concrete_signature_scenario() {
    let token = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW));
    let rendered = token.to_string();

    assert!(rendered.starts_with("t=1700000000000,v1="));
    assert_eq!(token.digest().len(), 64);
    assert!(token.digest().bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));

    // Deterministic
    assert_eq!(rendered, generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW)).to_string());

    // Round-trips through the wire form
    let parsed: SignedToken = rendered.parse().unwrap();
    assert_eq!(parsed, token);
}

#[test]
fn test_sign_verify_round_trip_for_various_inputs() {
    init_tracing();
    let payloads: [&[u8]; 4] = [b"", b"{}", PAYLOAD.as_bytes(), "héllo wörld".as_bytes()];
    let secrets = ["", "s", SECRET];
    let timestamps = [NOW - 300_000, NOW, NOW + 299_999];

    for payload in payloads {
        for secret in secrets {
            for ts in timestamps {
                let token = generate_signature(payload, secret, Some(ts));
                let verifier = WebhookSignature::new(secret).with_clock(clock(NOW));
                assert!(
                    verifier
                        .verify(payload, &token.to_string(), DEFAULT_TOLERANCE_MS)
                        .unwrap()
                );
            }
        }
    }
}

// =============================================================================
// Verification failures
// =============================================================================

#[test]
fn test_verification_failure_kinds() {
    init_tracing();
    let verifier = WebhookSignature::new(SECRET).with_clock(clock(NOW));
    let token = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW)).to_string();

    let tampered = verifier
        .verify(br#"{"type":"hacked"}"#, &token, DEFAULT_TOLERANCE_MS)
        .unwrap_err();
    assert_eq!(tampered.kind(), ErrorKind::InvalidSignature);

    let stale = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW - 600_000)).to_string();
    let expired = verifier
        .verify(PAYLOAD.as_bytes(), &stale, DEFAULT_TOLERANCE_MS)
        .unwrap_err();
    assert_eq!(expired.kind(), ErrorKind::TimestampExpired);

    let empty = verifier.verify(PAYLOAD.as_bytes(), "", DEFAULT_TOLERANCE_MS).unwrap_err();
    assert_eq!(empty.to_string(), "Missing signature header");

    // No secret material leaks into any message
    for err in [tampered, expired, empty] {
        assert!(!err.to_string().contains(SECRET));
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn test_tolerance_override_same_token() {
    let receiver_strict = WebhookReceiver::new(SECRET)
        .with_tolerance_ms(30_000)
        .with_clock(clock(NOW));
    let receiver_lenient = WebhookReceiver::new(SECRET)
        .with_tolerance_ms(120_000)
        .with_clock(clock(NOW));

    let token = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW - 60_000)).to_string();

    assert_eq!(
        receiver_strict.verify(PAYLOAD.as_bytes(), &token),
        Err(WebhookError::TimestampExpired)
    );
    assert!(receiver_lenient.verify(PAYLOAD.as_bytes(), &token).unwrap());
}

#[test]
fn test_replay_within_window_is_accepted() {
    // No nonce cache: the same token verifies as often as it is presented.
    let receiver = WebhookReceiver::new(SECRET).with_clock(clock(NOW));
    let token = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW)).to_string();

    for _ in 0..3 {
        assert!(receiver.verify(PAYLOAD.as_bytes(), &token).unwrap());
    }
}

// =============================================================================
// Envelope construction
// =============================================================================

#[test]
fn test_sender_to_receiver_workflow() {
    init_tracing();
    let signer = WebhookSignature::new(SECRET).with_clock(clock(NOW));
    let outgoing = SignedHeaders::with_ids(PAYLOAD.as_bytes(), &signer, "evt_123", "dlv_456");

    // Receiver clock slightly ahead of the sender's
    let receiver = WebhookReceiver::new(SECRET).with_clock(clock(NOW + 2_000));
    let event = receiver
        .construct_event(PAYLOAD.as_bytes(), &outgoing.to_map())
        .unwrap();

    assert_eq!(event.event_id, "evt_123");
    assert_eq!(event.delivery_id, "dlv_456");
    assert_eq!(event.timestamp, NOW);
    assert_eq!(event.event_type, "order.completed");
    assert_eq!(event.data, json!({"orderId": "12345"}));
}

#[test]
fn test_header_casing_and_arrays_are_equivalent() {
    let token = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW)).to_string();
    let receiver = WebhookReceiver::new(SECRET).with_clock(clock(NOW));

    let variants: Vec<HashMap<String, HeaderValue>> = ["x-signature", "X-Signature", "X-SIGNATURE"]
        .into_iter()
        .flat_map(|name| {
            [
                HashMap::from([
                    (name.to_string(), HeaderValue::from(token.as_str())),
                    ("X-Event-Id".to_string(), HeaderValue::from("evt_123")),
                ]),
                HashMap::from([
                    (name.to_string(), HeaderValue::from(vec![token.clone()])),
                    ("x-event-id".to_string(), HeaderValue::from(vec!["evt_123"])),
                ]),
            ]
        })
        .collect();

    let events: Vec<WebhookEvent> = variants
        .into_iter()
        .map(|headers| receiver.construct_event(PAYLOAD.as_bytes(), headers).unwrap())
        .collect();

    assert!(events.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(events[0].event_id, "evt_123");
}

#[test]
fn test_flat_payload_envelope() {
    let payload = r#"{"type":"test.event","value":123}"#;
    let token = generate_signature(payload.as_bytes(), SECRET, Some(NOW)).to_string();

    let receiver = WebhookReceiver::new(SECRET).with_clock(clock(NOW));
    let event = receiver
        .construct_event(payload.as_bytes(), [("X-Signature", token)])
        .unwrap();

    assert_eq!(event.event_type, "test.event");
    assert_eq!(event.data, json!({"type": "test.event", "value": 123}));
    assert_eq!(event.event_id, "");
    assert_eq!(event.delivery_id, "");
    assert_eq!(event.timestamp, NOW);
}

#[test]
fn test_envelope_errors_are_terminal_and_typed() {
    let receiver = WebhookReceiver::new(SECRET).with_clock(clock(NOW));

    let missing = receiver
        .construct_event(PAYLOAD.as_bytes(), [("X-Timestamp", "1700000000000")])
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::MissingHeader);
    assert_eq!(missing.error_code(), Some("missing_header"));

    let body = b"not valid json";
    let token = generate_signature(body, SECRET, Some(NOW)).to_string();
    let invalid = receiver
        .construct_event(body, [("X-Signature", token)])
        .unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::InvalidPayload);
    assert_eq!(invalid.to_string(), "Invalid JSON payload");
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_receiver_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receiver.json");
    std::fs::write(
        &path,
        format!(r#"{{"webhook_secret": "{SECRET}", "webhook_tolerance_ms": 30000}}"#),
    )
    .unwrap();

    let settings = ReceiverSettings::from_file(&path).unwrap();
    let receiver = WebhookReceiver::from_settings(&settings).with_clock(clock(NOW));
    assert_eq!(receiver.tolerance_ms(), 30_000);

    let token = generate_signature(PAYLOAD.as_bytes(), SECRET, Some(NOW - 10_000)).to_string();
    assert!(receiver.verify(PAYLOAD.as_bytes(), &token).unwrap());
}

#[test]
fn test_platform_config_defaults() {
    let config = PlatformConfig::new("test_api_key").unwrap();
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.endpoint_url("/api/v1/events"), "http://localhost:8080/api/v1/events");

    assert_eq!(
        PlatformConfig::new("").unwrap_err().to_string(),
        "API key is required"
    );
}
