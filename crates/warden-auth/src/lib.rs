//! # warden-auth
//!
//! Token issuing and verification plus role-based authorization checks.
//!
//! ## Modules
//!
//! - `jwt` — claims model, the token authority, and its error taxonomy
//! - `roles` — well-known role names
//! - `context` — per-request carrier for validated claims

pub mod context;
pub mod jwt;
pub mod roles;

pub use context::{CLAIMS_CONTEXT_KEY, ContextCarrier, RequestContext};
pub use jwt::{AuthError, Claims, TokenAuthority, ValidationFailure};
pub use roles::{ROLE_ADMIN, ROLE_USER};
