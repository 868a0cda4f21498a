//! Token verification implementations.

pub mod jwt;

pub use jwt::{AccessClaims, JwtTokenVerifier};
