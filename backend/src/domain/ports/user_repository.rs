//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique field already holds the submitted value.
        Duplicate { field: String } => "duplicate user {field}",
    }
}

/// Storage for user accounts.
///
/// `update` and `delete` return `false` when the user no longer exists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch the user holding a reset token with this digest.
    async fn find_by_reset_digest(
        &self,
        digest: &str,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Every user, in no particular order.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Insert a new user; a taken email yields `Duplicate`.
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Overwrite a stored user.
    async fn update(&self, user: &User) -> Result<bool, UserRepositoryError>;

    /// Remove a user.
    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;
}
