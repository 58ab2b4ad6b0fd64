//! Token signing and validation against a pinned HMAC algorithm.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use serde_json::{Map, Value};

use warden_core::config::AuthConfig;

use super::claims::Claims;
use super::error::{AuthError, ValidationFailure};

/// The closed set of signing algorithms an authority can be built with.
const SUPPORTED_ALGORITHMS: [(&str, Algorithm); 3] = [
    ("HS256", Algorithm::HS256),
    ("HS384", Algorithm::HS384),
    ("HS512", Algorithm::HS512),
];

/// Default lifetime stamped by [`TokenAuthority::issue`].
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Only the field needed to compare against the allow-list.
#[derive(Deserialize)]
struct HeaderProbe {
    alg: String,
}

/// Decoded, still untrusted header segment.
struct RawHeader {
    alg: String,
    json: Vec<u8>,
}

/// Issues and validates signed tokens with one fixed secret and algorithm.
///
/// The authority is immutable once built and can be shared freely across
/// threads. The algorithm used to verify a token always comes from the
/// allow-list fixed here, never from the token's own header.
#[derive(Clone)]
pub struct TokenAuthority {
    /// Name of the signing algorithm, as written in token headers.
    algorithm_name: &'static str,
    /// Signing algorithm.
    algorithm: Algorithm,
    /// Header names accepted during validation. Exactly one entry.
    allowed_algorithms: Vec<&'static str>,
    /// HMAC secret for signing.
    encoding_key: EncodingKey,
    /// HMAC secret for verification.
    decoding_key: DecodingKey,
    /// Signature-only validation; temporal checks run separately.
    validation: Validation,
    /// Clock-skew tolerance for `exp` and `nbf`, in seconds.
    leeway_seconds: u64,
    /// Lifetime applied by `issue` when claims carry no `exp`.
    token_ttl: Duration,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("algorithm", &self.algorithm_name)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Creates an authority for `algorithm` signing with `secret`.
    ///
    /// Fails if the algorithm is not one of `HS256`, `HS384`, `HS512`, or if
    /// the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>, algorithm: &str) -> Result<Self, AuthError> {
        let (algorithm_name, algorithm) = SUPPORTED_ALGORITHMS
            .iter()
            .copied()
            .find(|(name, _)| *name == algorithm)
            .ok_or_else(|| AuthError::Configuration("unknown algorithm".to_string()))?;

        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::Configuration("empty signing secret".to_string()));
        }

        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            algorithm_name,
            algorithm,
            allowed_algorithms: vec![algorithm_name],
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway_seconds: 0,
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        })
    }

    /// Creates an authority from the `auth` configuration section.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        config
            .validate()
            .map_err(|e| AuthError::Configuration(e.message))?;

        let token_ttl = i64::try_from(config.token_ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                AuthError::Configuration("auth.token_ttl_minutes is out of range".to_string())
            })?;

        let authority = Self::new(config.jwt_secret.as_bytes(), &config.jwt_algorithm)?
            .with_leeway(config.leeway_seconds)
            .with_token_ttl(token_ttl);

        tracing::info!(
            algorithm = authority.algorithm_name,
            leeway_seconds = authority.leeway_seconds,
            "Token authority configured"
        );

        Ok(authority)
    }

    /// Sets the clock-skew tolerance for `exp` and `nbf`.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Sets the lifetime [`issue`](Self::issue) applies to claims without `exp`.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Returns the signing algorithm name.
    pub fn algorithm(&self) -> &str {
        self.algorithm_name
    }

    /// Returns the algorithm names accepted during validation.
    pub fn allowed_algorithms(&self) -> &[&'static str] {
        &self.allowed_algorithms
    }

    /// Signs `claims` and returns the compact `header.payload.signature` form.
    ///
    /// No expiration is added; callers set `exp` themselves.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Stamps `iat` and, if missing, `exp` from the configured TTL, then signs.
    pub fn issue(&self, mut claims: Claims) -> Result<String, AuthError> {
        let now = Utc::now();
        claims.iat = Some(now.timestamp());
        if claims.exp.is_none() {
            let exp = now.checked_add_signed(self.token_ttl).ok_or_else(|| {
                AuthError::Signing("token lifetime overflows the supported date range".to_string())
            })?;
            claims.exp = Some(exp.timestamp());
        }
        self.generate_token(&claims)
    }

    /// Verifies `token` and recovers the claims it carries.
    ///
    /// Steps, each terminal on failure: structure, algorithm pinning,
    /// signature, expiration/not-before, payload shape.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.run_validation(token).map_err(|failure| {
            tracing::debug!(%failure, algorithm = self.algorithm_name, "Token rejected");
            AuthError::Validation(failure)
        })
    }

    fn run_validation(&self, token: &str) -> Result<Claims, ValidationFailure> {
        let header = parse_structure(token)?;

        if !self.allowed_algorithms.contains(&header.alg.as_str()) {
            return Err(ValidationFailure::AlgorithmMismatch);
        }

        // Full header shape; decoder JSON errors past this point come from the payload.
        serde_json::from_slice::<Header>(&header.json)
            .map_err(|_| ValidationFailure::MalformedToken)?;

        // Verifies the MAC with `self.algorithm`; the header value was only compared above.
        let payload = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(&e))?
            .claims;

        self.check_time_window(&payload)?;

        serde_json::from_value(Value::Object(payload))
            .map_err(|_| ValidationFailure::MalformedClaims)
    }

    fn check_time_window(&self, payload: &Map<String, Value>) -> Result<(), ValidationFailure> {
        let now = Utc::now().timestamp();
        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);

        if let Some(exp) = numeric_date(payload, "exp")? {
            if exp < now.saturating_sub(leeway) {
                return Err(ValidationFailure::Expired);
            }
        }

        if let Some(nbf) = numeric_date(payload, "nbf")? {
            if nbf > now.saturating_add(leeway) {
                return Err(ValidationFailure::NotYetValid);
            }
        }

        Ok(())
    }
}

/// Checks for three segments, a decodable signature, and a header naming an
/// algorithm.
fn parse_structure(token: &str) -> Result<RawHeader, ValidationFailure> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, _payload, signature] = segments.as_slice() else {
        return Err(ValidationFailure::MalformedToken);
    };

    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| ValidationFailure::MalformedToken)?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| ValidationFailure::MalformedToken)?;

    let probe = serde_json::from_slice::<HeaderProbe>(&header_bytes)
        .map_err(|_| ValidationFailure::MalformedToken)?;

    Ok(RawHeader {
        alg: probe.alg,
        json: header_bytes,
    })
}

/// Reads a NumericDate claim. `null` counts as absent.
fn numeric_date(payload: &Map<String, Value>, key: &str) -> Result<Option<i64>, ValidationFailure> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or(ValidationFailure::MalformedClaims),
    }
}

/// Maps a decoder error to a rejection reason. Structure, header shape and
/// algorithm have already been checked, so decode failures here concern the
/// payload.
fn classify(err: &jsonwebtoken::errors::Error) -> ValidationFailure {
    match err.kind() {
        JwtErrorKind::InvalidSignature => ValidationFailure::BadSignature,
        JwtErrorKind::InvalidAlgorithm => ValidationFailure::AlgorithmMismatch,
        JwtErrorKind::ExpiredSignature => ValidationFailure::Expired,
        JwtErrorKind::ImmatureSignature => ValidationFailure::NotYetValid,
        JwtErrorKind::Base64(_)
        | JwtErrorKind::Json(_)
        | JwtErrorKind::Utf8(_)
        | JwtErrorKind::MissingRequiredClaim(_) => ValidationFailure::MalformedClaims,
        _ => ValidationFailure::MalformedToken,
    }
}
