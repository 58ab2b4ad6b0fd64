//! Token authority configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Signing and validation settings for the token authority.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to sign and verify tokens.
    pub jwt_secret: String,
    /// HMAC algorithm name: `"HS256"`, `"HS384"` or `"HS512"`.
    #[serde(default = "default_algorithm")]
    pub jwt_algorithm: String,
    /// Clock-skew tolerance applied to `exp` and `nbf`, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,
    /// Lifetime stamped on issued tokens that carry no expiration.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
}

impl AuthConfig {
    /// Creates a configuration with default algorithm, leeway and TTL.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_algorithm: default_algorithm(),
            leeway_seconds: 0,
            token_ttl_minutes: default_token_ttl(),
        }
    }

    /// Rejects settings that cannot produce a working authority.
    pub fn validate(&self) -> AppResult<()> {
        if self.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.token_ttl_minutes == 0 {
            return Err(AppError::configuration(
                "auth.token_ttl_minutes must be greater than zero",
            ));
        }
        Ok(())
    }
}

// The secret never reaches logs through `{:?}`.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl() -> u64 {
    15
}
