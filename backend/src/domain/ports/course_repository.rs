//! Port abstraction for course persistence.
use async_trait::async_trait;

use crate::domain::{BootcampId, Course, CourseId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
        /// The referenced bootcamp disappeared before the write.
        MissingBootcamp { id: BootcampId } => "bootcamp {id} does not exist",
    }
}

/// Storage for courses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fetch a course by identifier.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError>;

    /// Courses of one bootcamp, or every course when `bootcamp` is `None`.
    async fn list(
        &self,
        bootcamp: Option<BootcampId>,
    ) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Insert a new course.
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Overwrite a stored course; `false` when it no longer exists.
    async fn update(&self, course: &Course) -> Result<bool, CourseRepositoryError>;

    /// Remove a course; `false` when it no longer exists.
    async fn delete(&self, id: &CourseId) -> Result<bool, CourseRepositoryError>;
}
