//! Port abstraction for review persistence.
use async_trait::async_trait;

use crate::domain::{BootcampId, Review, ReviewId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// The referenced bootcamp disappeared before the write.
        MissingBootcamp { id: BootcampId } => "bootcamp {id} does not exist",
    }
}

/// Storage for reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fetch a review by identifier.
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Reviews of one bootcamp, or every review when `bootcamp` is `None`.
    async fn list(
        &self,
        bootcamp: Option<BootcampId>,
    ) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// Insert a new review.
    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Overwrite a stored review; `false` when it no longer exists.
    async fn update(&self, review: &Review) -> Result<bool, ReviewRepositoryError>;

    /// Remove a review; `false` when it no longer exists.
    async fn delete(&self, id: &ReviewId) -> Result<bool, ReviewRepositoryError>;
}
