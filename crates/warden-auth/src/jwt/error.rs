//! Errors raised while building an authority, signing, or validating tokens.

use thiserror::Error;

use warden_core::error::AppError;

/// Why a token was rejected.
///
/// Every variant means "unauthenticated". The distinction exists for
/// diagnostics only and is collapsed when converted into [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ValidationFailure {
    /// Not three dot-separated segments, or an undecodable header.
    #[error("malformed token")]
    MalformedToken,
    /// The header declares an algorithm outside the authority's allow-list.
    #[error("algorithm mismatch")]
    AlgorithmMismatch,
    /// The MAC does not match the header and payload.
    #[error("bad signature")]
    BadSignature,
    /// `exp` lies in the past.
    #[error("token expired")]
    Expired,
    /// `nbf` lies in the future.
    #[error("token not yet valid")]
    NotYetValid,
    /// The payload does not deserialize into claims.
    #[error("malformed claims")]
    MalformedClaims,
}

/// Errors produced by [`TokenAuthority`](super::TokenAuthority).
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authority cannot be built from the given settings.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Serializing or signing a token failed.
    #[error("signing token: {0}")]
    Signing(String),
    /// The token was rejected.
    #[error("validating token: {0}")]
    Validation(#[from] ValidationFailure),
}

impl AuthError {
    /// Returns the rejection reason if this is a validation error.
    pub fn validation_failure(&self) -> Option<ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(*failure),
            _ => None,
        }
    }
}

/// Message every rejected token surfaces with at the boundary.
pub const GENERIC_AUTH_FAILURE: &str = "invalid or expired token";

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Configuration(message) => AppError::configuration(message),
            AuthError::Signing(message) => {
                AppError::internal(format!("Failed to sign token: {message}"))
            }
            AuthError::Validation(_) => AppError::authentication(GENERIC_AUTH_FAILURE),
        }
    }
}
