//! Well-known values for [`Claims::roles`](crate::jwt::Claims::roles).

/// Administrative access.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Regular authenticated user.
pub const ROLE_USER: &str = "USER";
