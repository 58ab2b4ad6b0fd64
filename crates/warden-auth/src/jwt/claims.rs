//! JWT claims payload carried by every token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Identity and authorization facts embedded in a token.
///
/// Registered claims are optional; an absent field imposes no constraint.
/// Timestamps are NumericDate values (seconds since the Unix epoch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject, usually the user ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Intended audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not-before time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// JWT ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login identifier.
    #[serde(default)]
    pub username: String,
    /// Role tags granted to the principal.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Creates claims with the private fields set and no registered claims.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        username: impl Into<String>,
        roles: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Sets the audience.
    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    /// Sets the JWT ID.
    pub fn with_jti(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Stamps the issued-at time with the current time.
    pub fn issued_now(mut self) -> Self {
        self.iat = Some(Utc::now().timestamp());
        self
    }

    /// Sets the expiration relative to now, clamped to the representable range.
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        let now = Utc::now();
        let at = now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        self.exp = Some(at.timestamp());
        self
    }

    /// Sets the earliest time the token may be used.
    pub fn not_before(mut self, at: DateTime<Utc>) -> Self {
        self.nbf = Some(at.timestamp());
        self
    }

    /// Returns the expiration as a `DateTime<Utc>`, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Checks whether the expiration has passed. Claims without `exp` never expire.
    pub fn is_expired(&self) -> bool {
        self.exp.is_some_and(|exp| exp < Utc::now().timestamp())
    }

    /// Returns true if the claims hold at least one of `required` roles.
    ///
    /// An empty `required` list never matches.
    pub fn authorized<S: AsRef<str>>(&self, required: &[S]) -> bool {
        self.roles
            .iter()
            .any(|has| required.iter().any(|want| has == want.as_ref()))
    }

    /// Like [`authorized`](Self::authorized), but returns an authorization error on failure.
    pub fn require_roles<S: AsRef<str>>(&self, required: &[S]) -> AppResult<()> {
        if self.authorized(required) {
            return Ok(());
        }
        let wanted: Vec<&str> = required.iter().map(|role| role.as_ref()).collect();
        Err(AppError::authorization(format!(
            "User '{}' lacks any of the required roles [{}]",
            self.username,
            wanted.join(", ")
        )))
    }
}
