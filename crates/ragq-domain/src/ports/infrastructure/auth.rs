//! Authentication Ports
//!
//! Password hashing and JWT issuance are out of scope (assumed external
//! library, §1); these ports cover only the verification half this
//! service actually performs.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The decoded payload of a verified access or refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Username, the JWT `sub` claim.
    pub subject: String,
    /// `"access"` or `"refresh"`.
    pub token_type: String,
    /// Unix timestamp the token expires at, the JWT `exp` claim.
    pub expires_at: i64,
}

/// Verifies `Authorization: Bearer <JWT>` tokens (HS256).
///
/// No issuance method exists on this port: a login flow that mints tokens
/// is explicitly out of scope.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`'s signature and expiry, returning its claims.
    /// Returns `Error::Authentication` for a bad signature, malformed
    /// token, or expired token.
    async fn verify(&self, token: &str) -> Result<TokenClaims>;
}

/// Verifies a plaintext password against a stored hash.
///
/// No hashing method exists on this port: account provisioning is
/// explicitly out of scope.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Check `password` against `hash`, returning `true` on match.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
