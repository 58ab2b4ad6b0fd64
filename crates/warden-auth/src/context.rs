//! Request context carrying validated claims through one request's pipeline.
//!
//! The context is passed explicitly: an HTTP layer validates the token,
//! attaches a [`RequestContext`] to its per-request [`ContextCarrier`], and
//! downstream handlers read it back under [`CLAIMS_CONTEXT_KEY`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use warden_core::error::AppError;
use warden_core::result::AppResult;

use crate::jwt::{Claims, TokenAuthority};

/// Well-known key under which validated claims are attached.
pub const CLAIMS_CONTEXT_KEY: &str = "warden.claims";

/// Context for the current authenticated request.
///
/// Claims are shared read-only; nothing reachable from here can change the
/// identity that was validated.
#[derive(Debug, Clone)]
pub struct RequestContext {
    claims: Arc<Claims>,
    request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Wraps already-validated claims.
    pub fn new(claims: Claims) -> Self {
        Self {
            claims: Arc::new(claims),
            request_time: Utc::now(),
        }
    }

    /// Validates `token` and builds the context from its claims.
    ///
    /// Every rejection reason collapses into one authentication error.
    pub fn authenticate(authority: &TokenAuthority, token: &str) -> AppResult<Self> {
        let claims = authority.validate_token(token)?;
        Ok(Self::new(claims))
    }

    /// Returns the validated claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Returns the login identifier.
    pub fn username(&self) -> &str {
        &self.claims.username
    }

    /// Returns the subject, if the token carried one.
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }

    /// When the context was created.
    pub fn request_time(&self) -> DateTime<Utc> {
        self.request_time
    }

    /// Returns true if the principal holds at least one of `roles`.
    pub fn authorized<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        self.claims.authorized(roles)
    }

    /// Returns an authorization error unless the principal holds one of `roles`.
    pub fn require_roles<S: AsRef<str>>(&self, roles: &[S]) -> AppResult<()> {
        self.claims.require_roles(roles)
    }
}

/// Per-request value bag keyed by string, in the style of HTTP request extensions.
#[derive(Default)]
pub struct ContextCarrier {
    values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for ContextCarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCarrier")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ContextCarrier {
    /// Creates an empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning any previous value of the same type.
    ///
    /// The identity key is reserved for [`attach_claims`](Self::attach_claims).
    pub fn insert<T: Any + Send + Sync>(
        &mut self,
        key: &'static str,
        value: T,
    ) -> AppResult<Option<T>> {
        if key == CLAIMS_CONTEXT_KEY {
            return Err(AppError::conflict(format!(
                "Key '{CLAIMS_CONTEXT_KEY}' is reserved for the authenticated identity"
            )));
        }
        Ok(self
            .values
            .insert(key, Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok())
            .map(|prev| *prev))
    }

    /// Returns the value under `key` if it exists and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Attaches the validated identity. Fails if one is already attached.
    pub fn attach_claims(&mut self, context: RequestContext) -> AppResult<()> {
        if self.values.contains_key(CLAIMS_CONTEXT_KEY) {
            return Err(AppError::conflict(
                "Request already carries an authenticated identity",
            ));
        }
        self.values.insert(CLAIMS_CONTEXT_KEY, Box::new(context));
        Ok(())
    }

    /// Returns the attached identity, if any.
    pub fn claims_context(&self) -> Option<&RequestContext> {
        self.get::<RequestContext>(CLAIMS_CONTEXT_KEY)
    }

    /// Returns the attached identity or an authentication error.
    pub fn require_claims_context(&self) -> AppResult<&RequestContext> {
        self.claims_context()
            .ok_or_else(|| AppError::authentication("Request is not authenticated"))
    }
}
