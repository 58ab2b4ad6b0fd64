//! Shared test helpers for integration tests.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use serde_json::Value;

use warden::{Claims, TokenAuthority};

/// Secret shared by the default test authority.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Builds an HS256 authority with [`TEST_SECRET`].
pub fn authority() -> TokenAuthority {
    TokenAuthority::new(TEST_SECRET, "HS256").expect("Failed to build test authority")
}

/// Builds claims for `username` with `roles` that expire in ten minutes.
pub fn session_claims(username: &str, roles: &[&str]) -> Claims {
    Claims::new(format!("{username} Tester"), username, roles.iter().copied())
        .with_subject(format!("user-{username}"))
        .issued_now()
        .expires_in(Duration::minutes(10))
}

/// Splits a compact token into its three segments.
pub fn segments(token: &str) -> (String, String, String) {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "compact token must have three segments");
    (
        parts[0].to_string(),
        parts[1].to_string(),
        parts[2].to_string(),
    )
}

/// Decodes a base64url segment as JSON.
pub fn decode_segment(segment: &str) -> Value {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .expect("segment must be base64url");
    serde_json::from_slice(&bytes).expect("segment must be JSON")
}

/// Encodes JSON as a base64url segment.
pub fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).expect("serialize segment"))
}
