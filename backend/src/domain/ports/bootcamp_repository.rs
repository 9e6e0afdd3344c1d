//! Port abstraction for bootcamp persistence, including the radius query
//! and the cascading delete.
use async_trait::async_trait;

use crate::domain::{Bootcamp, BootcampId, GeoPoint, Radius, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by bootcamp repository adapters.
    pub enum BootcampRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "bootcamp repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "bootcamp repository query failed: {message}",
        /// A unique field already holds the submitted value.
        Duplicate { field: String } => "duplicate bootcamp {field}",
    }
}

/// Storage for bootcamps.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BootcampRepository: Send + Sync {
    /// Fetch a bootcamp by identifier.
    async fn find_by_id(&self, id: &BootcampId)
    -> Result<Option<Bootcamp>, BootcampRepositoryError>;

    /// Fetch any bootcamp owned by `owner`.
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<Bootcamp>, BootcampRepositoryError>;

    /// Every bootcamp, in no particular order.
    async fn list(&self) -> Result<Vec<Bootcamp>, BootcampRepositoryError>;

    /// Bootcamps whose location lies within `radius` of `centre`.
    async fn within_radius(
        &self,
        centre: &GeoPoint,
        radius: Radius,
    ) -> Result<Vec<Bootcamp>, BootcampRepositoryError>;

    /// Insert a new bootcamp; a taken name or slug yields `Duplicate`.
    async fn create(&self, bootcamp: &Bootcamp) -> Result<(), BootcampRepositoryError>;

    /// Overwrite a stored bootcamp; `false` when it no longer exists.
    async fn update(&self, bootcamp: &Bootcamp) -> Result<bool, BootcampRepositoryError>;

    /// Remove a bootcamp together with its courses and reviews.
    ///
    /// Returns `false` when the bootcamp no longer exists.
    async fn delete_cascade(&self, id: &BootcampId) -> Result<bool, BootcampRepositoryError>;
}
