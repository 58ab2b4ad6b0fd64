//! JWT claims, signing, and validation.

pub mod authority;
pub mod claims;
pub mod error;

pub use authority::TokenAuthority;
pub use claims::Claims;
pub use error::{AuthError, ValidationFailure};
