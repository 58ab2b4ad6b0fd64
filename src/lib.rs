//! # Warden
//!
//! Issues and verifies signed bearer tokens that carry identity and role
//! claims, and checks role membership for authorization decisions.
//!
//! ```no_run
//! use warden::{Claims, ROLE_ADMIN, TokenAuthority};
//!
//! # fn main() -> Result<(), warden::AuthError> {
//! let authority = TokenAuthority::new(b"signing-secret", "HS256")?;
//! let token = authority.issue(Claims::new("Ada", "ada", [ROLE_ADMIN]))?;
//!
//! let claims = authority.validate_token(&token)?;
//! assert!(claims.authorized(&[ROLE_ADMIN]));
//! # Ok(())
//! # }
//! ```

pub use warden_auth::context::{CLAIMS_CONTEXT_KEY, ContextCarrier, RequestContext};
pub use warden_auth::jwt::error::GENERIC_AUTH_FAILURE;
pub use warden_auth::jwt::{AuthError, Claims, TokenAuthority, ValidationFailure};
pub use warden_auth::roles::{ROLE_ADMIN, ROLE_USER};
pub use warden_core::config::{AppConfig, AuthConfig, LoggingConfig};
pub use warden_core::error::{AppError, ErrorKind};
pub use warden_core::logging;
pub use warden_core::result::AppResult;
