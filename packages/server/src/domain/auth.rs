//! Bearer token verification seam.

use super::error::TokenError;

/// Verified claims of a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject user id, not yet resolved to an identity kind
    pub subject: String,
    /// Expiry, Unix seconds
    pub expires_at: i64,
}

/// Verifies signature and expiry of a bearer token against a shared secret.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
