//! Authentication primitives: login credentials and password reset tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate raw inputs before a handler talks to a service.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{EmailAddress, Error, PasswordReset};

/// Lifetime of a password reset token, in minutes.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

const RESET_TOKEN_BYTES: usize = 20;

/// Domain error returned when login payload values are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginValidationError;

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Please provide an email and password")
    }
}

impl std::error::Error for LoginValidationError {}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        Error::invalid_request(value.to_string())
    }
}

/// Validated login credentials used by the auth service.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased but not format-checked; a malformed
///   address simply matches no account.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use devcamper::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(Some(" John@Gmail.com "), Some("123456")).unwrap();
/// assert_eq!(creds.email().as_ref(), "john@gmail.com");
/// assert!(LoginCredentials::try_from_parts(None, Some("123456")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, LoginValidationError> {
        let email = email
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(LoginValidationError)?;
        let password = password
            .filter(|value| !value.is_empty())
            .ok_or(LoginValidationError)?;
        Ok(Self {
            email: EmailAddress::lookup_key(email),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Login payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginInput> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginInput) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.email.as_deref(), value.password.as_deref())
    }
}

/// Password change payload for the current user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Forgotten password payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordInput {
    pub email: Option<String>,
}

/// New password submitted with a reset token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordInput {
    pub password: Option<String>,
}

/// Plain reset token mailed to the user alongside the stored reset state.
#[derive(Debug)]
pub struct IssuedResetToken {
    /// Token embedded in the reset URL.
    pub token: Zeroizing<String>,
    /// State persisted on the user; holds only the digest.
    pub reset: PasswordReset,
}

/// Generate a random reset token that expires ten minutes after `now`.
pub fn issue_reset_token(now: DateTime<Utc>) -> IssuedResetToken {
    let mut bytes = [0_u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = Zeroizing::new(hex::encode(bytes));
    let reset = PasswordReset {
        token_digest: reset_token_digest(&token),
        expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    };
    IssuedResetToken { token, reset }
}

/// SHA-256 hex digest under which a reset token is stored.
///
/// # Examples
/// ```
/// use devcamper::domain::reset_token_digest;
///
/// let digest = reset_token_digest("token");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, reset_token_digest("token"));
/// ```
pub fn reset_token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl PasswordReset {
    /// Whether the token is still accepted at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some("pw"))]
    #[case(Some("   "), Some("pw"))]
    #[case(Some("john@gmail.com"), None)]
    #[case(Some("john@gmail.com"), Some(""))]
    fn rejects_missing_parts(#[case] email: Option<&str>, #[case] password: Option<&str>) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("missing parts");
        assert_eq!(Error::from(err).message(), "Please provide an email and password");
    }

    #[rstest]
    fn keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts(Some("a@b.io"), Some(" pw "))
            .expect("valid credentials");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    fn issued_tokens_store_only_the_digest() {
        let now = Utc::now();
        let issued = issue_reset_token(now);
        assert_eq!(issued.token.len(), RESET_TOKEN_BYTES * 2);
        assert_ne!(issued.reset.token_digest, *issued.token);
        assert_eq!(issued.reset.token_digest, reset_token_digest(&issued.token));
        assert_eq!(
            issued.reset.expires_at,
            now + Duration::minutes(RESET_TOKEN_TTL_MINUTES)
        );
    }

    #[rstest]
    fn tokens_differ_between_issues() {
        let now = Utc::now();
        assert_ne!(*issue_reset_token(now).token, *issue_reset_token(now).token);
    }

    #[rstest]
    fn reset_expires_after_ten_minutes() {
        let now = Utc::now();
        let reset = issue_reset_token(now).reset;
        assert!(reset.is_valid_at(now + Duration::minutes(9)));
        assert!(!reset.is_valid_at(now + Duration::minutes(10)));
    }
}
