//! Authentication and Authorization
//!
//! JWT carries identity only; the permission gate resolves the effective
//! permission set from the store on every request.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_permission};
