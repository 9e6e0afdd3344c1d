//! User accounts, roles and the inputs that create or change them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::listing::{FieldValue, Listable};
use super::validation::{FieldErrors, char_len, is_valid_email};
use super::{Error, UserId};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Longest display name accepted.
pub const NAME_MAX: usize = 100;

/// Access role attached to every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account; may write reviews.
    #[default]
    User,
    /// May publish a bootcamp and its courses.
    Publisher,
    /// Unrestricted access.
    Admin,
}

impl Role {
    /// Lower-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Publisher => "publisher",
            Self::Admin => "admin",
        }
    }

    /// Parse a wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "publisher" => Some(Self::Publisher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, lower-cased email address.
///
/// # Examples
/// ```
/// use devcamper::domain::EmailAddress;
///
/// let email = EmailAddress::new(" John@Gmail.com ").unwrap();
/// assert_eq!(email.as_ref(), "john@gmail.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

/// Error raised when an email address is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please add a valid email")]
pub struct InvalidEmail;

impl EmailAddress {
    /// Normalise and validate an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidEmail> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if is_valid_email(&normalised) {
            Ok(Self(normalised))
        } else {
            Err(InvalidEmail)
        }
    }

    /// Lower-case the address without validating it.
    ///
    /// Used for lookups where a malformed address simply matches nothing.
    pub fn lookup_key(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded password hash as produced by a `PasswordHasher` port.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Outstanding password reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    /// SHA-256 hex digest of the token mailed to the user.
    pub token_digest: String,
    /// Moment after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Registered account.
///
/// The password hash and reset state never serialise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
    pub role: Role,
    #[serde(skip)]
    pub password_hash: PasswordHash,
    #[serde(skip)]
    pub password_reset: Option<PasswordReset>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Listable for User {
    const FIELDS: &'static [&'static str] = &["id", "name", "email", "role", "createdAt"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Text(self.id.to_string())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "email" => Some(FieldValue::Text(self.email.to_string())),
            "role" => Some(FieldValue::Text(self.role.as_str().to_owned())),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// Raw account input for registration and admin creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Validated account input ready for hashing and persistence.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: EmailAddress,
    pub role: Role,
    pub password: Zeroizing<String>,
}

impl UserDraft {
    /// Validate every field; `allowed_roles` bounds the requested role.
    pub fn validate(self, allowed_roles: &[Role]) -> Result<NewUser, Error> {
        let mut errors = FieldErrors::new();
        let name = validate_name(&mut errors, self.name);
        let email = validate_email(&mut errors, self.email);
        let password = validate_password(&mut errors, self.password);
        let role = validate_role(&mut errors, self.role.as_deref(), allowed_roles);
        errors.finish()?;

        match (name, email, password, role) {
            (Some(name), Some(email), Some(password), Some(role)) => Ok(NewUser {
                name,
                email,
                role,
                password,
            }),
            _ => Err(Error::internal("user validation produced incomplete input")),
        }
    }
}

fn validate_name(errors: &mut FieldErrors, raw: Option<String>) -> Option<String> {
    let name = errors.required_text(raw, "name", "Please add a name")?;
    if char_len(&name) > NAME_MAX {
        errors.push("name", format!("Name can not be more than {NAME_MAX} characters"));
        return None;
    }
    Some(name)
}

fn validate_email(errors: &mut FieldErrors, raw: Option<String>) -> Option<EmailAddress> {
    let raw = errors.required_text(raw, "email", "Please add an email")?;
    match EmailAddress::new(raw) {
        Ok(email) => Some(email),
        Err(err) => {
            errors.push("email", err.to_string());
            None
        }
    }
}

fn validate_password(errors: &mut FieldErrors, raw: Option<String>) -> Option<Zeroizing<String>> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        errors.push("password", "Please add a password");
        return None;
    };
    let password = Zeroizing::new(raw);
    if char_len(&password) < PASSWORD_MIN_LEN {
        errors.push(
            "password",
            format!("Password must be at least {PASSWORD_MIN_LEN} characters"),
        );
        return None;
    }
    Some(password)
}

/// Check a new password against the length rule.
pub fn validate_new_password(raw: Option<String>) -> Result<Zeroizing<String>, Error> {
    let mut errors = FieldErrors::new();
    let password = validate_password(&mut errors, raw);
    errors.finish()?;
    password.ok_or_else(|| Error::internal("password validation produced no value"))
}

fn validate_role(errors: &mut FieldErrors, raw: Option<&str>, allowed: &[Role]) -> Option<Role> {
    let role = match raw {
        None => Role::default(),
        Some(value) => match Role::parse(value.trim()) {
            Some(role) => role,
            None => {
                errors.push("role", format!("`{value}` is not a valid role"));
                return None;
            }
        },
    };
    if allowed.contains(&role) {
        Some(role)
    } else {
        errors.push("role", format!("Role {role} is not allowed"));
        None
    }
}

/// Partial account update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UserPatch {
    /// Validate and apply the patch; `role` is only honoured when `allow_role`.
    pub fn apply(self, user: &mut User, allow_role: bool) -> Result<(), Error> {
        let mut errors = FieldErrors::new();
        let name = self
            .name
            .map(|name| validate_name(&mut errors, Some(name)));
        let email = self.email.map(|email| validate_email(&mut errors, Some(email)));
        let role = match self.role {
            Some(role) if allow_role => Some(validate_role(
                &mut errors,
                Some(role.as_str()),
                &[Role::User, Role::Publisher, Role::Admin],
            )),
            _ => None,
        };
        errors.finish()?;

        if let Some(Some(name)) = name {
            user.name = name;
        }
        if let Some(Some(email)) = email {
            user.email = email;
        }
        if let Some(Some(role)) = role {
            user.role = role;
        }
        Ok(())
    }
}
