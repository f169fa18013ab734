//! Authentication infrastructure module
//!
//! Bearer token issuing and verification.

mod jwt;

pub use jwt::{BearerClaims, IssuedToken, JwtConfig, JwtGenerator, JwtService};
