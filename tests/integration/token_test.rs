//! Integration tests for the token lifecycle: issue, validate, reject.

mod helpers;

use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use serde_json::json;

use warden::{
    AppError, AuthError, Claims, ErrorKind, ROLE_ADMIN, ROLE_USER, TokenAuthority,
    ValidationFailure,
};

fn rejection(result: Result<Claims, AuthError>) -> ValidationFailure {
    result
        .expect_err("token must be rejected")
        .validation_failure()
        .expect("rejection must be a validation failure")
}

#[test]
fn test_round_trip_preserves_every_field() {
    let auth = helpers::authority();
    let claims = helpers::session_claims("alice", &[ROLE_ADMIN, ROLE_USER])
        .with_issuer("warden-tests")
        .with_audience("api")
        .with_jti("token-1")
        .not_before(Utc::now() - Duration::minutes(1));

    let token = auth.generate_token(&claims).expect("sign");
    let recovered = auth.validate_token(&token).expect("valid token");

    assert_eq!(recovered, claims);
}

#[test]
fn test_payload_uses_wire_field_names() {
    let auth = helpers::authority();
    let claims = helpers::session_claims("alice", &[ROLE_USER]);
    let token = auth.generate_token(&claims).expect("sign");

    let (header, payload, _) = helpers::segments(&token);
    let header = helpers::decode_segment(&header);
    let payload = helpers::decode_segment(&payload);

    assert_eq!(header["alg"], "HS256");
    assert_eq!(header["typ"], "JWT");
    assert_eq!(payload["username"], "alice");
    assert_eq!(payload["name"], "alice Tester");
    assert_eq!(payload["roles"], json!(["USER"]));
    assert_eq!(payload["sub"], "user-alice");
    assert!(payload["exp"].is_i64());
    assert!(payload.get("nbf").is_none());
}

#[test]
fn test_expired_token_rejected() {
    let auth = helpers::authority();
    let claims = helpers::session_claims("bob", &[ROLE_USER]).expires_in(Duration::hours(-1));
    let token = auth.generate_token(&claims).expect("sign");

    assert_eq!(rejection(auth.validate_token(&token)), ValidationFailure::Expired);
}

#[test]
fn test_none_algorithm_rejected() {
    let auth = helpers::authority();
    let token = auth
        .generate_token(&helpers::session_claims("mallory", &[ROLE_USER]))
        .expect("sign");
    let (_, payload, _) = helpers::segments(&token);

    let mut escalated = helpers::decode_segment(&payload);
    escalated["roles"] = json!([ROLE_ADMIN]);

    let forged = format!(
        "{}.{}.",
        helpers::encode_segment(&json!({"alg": "none", "typ": "JWT"})),
        helpers::encode_segment(&escalated)
    );

    assert_eq!(
        rejection(auth.validate_token(&forged)),
        ValidationFailure::AlgorithmMismatch
    );
}

#[test]
fn test_algorithm_downgrade_rejected() {
    let strong = TokenAuthority::new(helpers::TEST_SECRET, "HS512").expect("authority");
    let weak = helpers::authority();

    let token = weak
        .generate_token(&helpers::session_claims("carol", &[ROLE_USER]))
        .expect("sign");

    assert_eq!(
        rejection(strong.validate_token(&token)),
        ValidationFailure::AlgorithmMismatch
    );
}

#[test]
fn test_header_relabel_rejected() {
    let auth = helpers::authority();
    let token = auth
        .generate_token(&helpers::session_claims("dave", &[ROLE_USER]))
        .expect("sign");
    let (_, payload, signature) = helpers::segments(&token);

    let relabeled = format!(
        "{}.{payload}.{signature}",
        helpers::encode_segment(&json!({"alg": "HS384", "typ": "JWT"}))
    );

    assert_eq!(
        rejection(auth.validate_token(&relabeled)),
        ValidationFailure::AlgorithmMismatch
    );
}

#[test]
fn test_single_bit_flip_in_payload_detected() {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let auth = helpers::authority();
    let token = auth
        .generate_token(&helpers::session_claims("erin", &[ROLE_USER]))
        .expect("sign");
    let (header, payload, signature) = helpers::segments(&token);
    let bytes = URL_SAFE_NO_PAD.decode(&payload).expect("payload b64");

    for index in 0..bytes.len() {
        let mut flipped = bytes.clone();
        flipped[index] ^= 1u8 << (index % 8);
        let tampered = format!("{header}.{}.{signature}", URL_SAFE_NO_PAD.encode(&flipped));

        assert_eq!(
            rejection(auth.validate_token(&tampered)),
            ValidationFailure::BadSignature,
            "bit flip at byte {index} must be detected"
        );
    }
}

#[test]
fn test_secret_isolation() {
    let a = TokenAuthority::new("secret-a", "HS256").expect("authority a");
    let b = TokenAuthority::new("secret-b", "HS256").expect("authority b");
    let claims = helpers::session_claims("frank", &[ROLE_ADMIN]);

    let from_a = a.generate_token(&claims).expect("sign a");
    let from_b = b.generate_token(&claims).expect("sign b");

    assert_ne!(from_a, from_b);
    assert_eq!(rejection(b.validate_token(&from_a)), ValidationFailure::BadSignature);
    assert_eq!(rejection(a.validate_token(&from_b)), ValidationFailure::BadSignature);
}

#[test]
fn test_unknown_algorithm_fails_construction() {
    for name in ["none", "RS256", "ES256", "HS-256", "sha256"] {
        match TokenAuthority::new(helpers::TEST_SECRET, name) {
            Err(AuthError::Configuration(message)) => assert_eq!(message, "unknown algorithm"),
            other => panic!("expected configuration error for {name}, got {other:?}"),
        }
    }
}

#[test]
fn test_boundary_error_hides_reason() {
    let auth = helpers::authority();
    let stale = helpers::session_claims("gina", &[ROLE_USER]).expires_in(Duration::hours(-1));
    let expired = auth.generate_token(&stale).expect("sign");
    let forged = TokenAuthority::new("other", "HS256")
        .expect("authority")
        .generate_token(&helpers::session_claims("gina", &[ROLE_USER]))
        .expect("sign");

    let expired_err: AppError = auth.validate_token(&expired).expect_err("expired").into();
    let forged_err: AppError = auth.validate_token(&forged).expect_err("forged").into();

    assert_eq!(expired_err.kind, ErrorKind::Authentication);
    assert_eq!(expired_err.kind, forged_err.kind);
    assert_eq!(expired_err.message, forged_err.message);
}

#[test]
fn test_concurrent_use_of_shared_authority() {
    let auth = Arc::new(helpers::authority());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = Arc::clone(&auth);
            thread::spawn(move || {
                let username = format!("worker{i}");
                let claims = helpers::session_claims(&username, &[ROLE_USER]);
                let token = auth.generate_token(&claims).expect("sign");
                let recovered = auth.validate_token(&token).expect("valid");
                assert_eq!(recovered.username, username);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}
