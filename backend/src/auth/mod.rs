//! Authentication and authorization
//!
//! Password hashing, stateless bearer tokens, principal resolution and the
//! role gate that routes sit behind.

mod jwt;
mod middleware;
mod password;
mod principal;
mod resolver;

pub use jwt::{Claims, JwtService, TokenClaims};
pub use middleware::{authorize, bearer_token, require_admin, CurrentAdmin, CurrentStudent};
pub use password::PasswordService;
pub use principal::{AdminPrincipal, Principal, StudentPrincipal};
pub use resolver::PrincipalResolver;
