//! Port for issuing and verifying bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Signature, expiry or claim validation failed.
        Invalid { message: String } => "token rejected: {message}",
        /// The token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Signed token identifying a user until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue and verify stateless session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token whose subject is `user`.
    fn issue(&self, user: &UserId) -> Result<IssuedToken, TokenError>;

    /// Verify a token and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
