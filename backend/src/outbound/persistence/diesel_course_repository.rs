//! PostgreSQL-backed `CourseRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{BootcampId, Course, CourseId};

use super::diesel_helpers::{
    DbFailure, classify_diesel_error, classify_pool_error, collect_rows, query_optional,
};
use super::models::{CourseRow, CourseUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::courses;

/// Diesel-backed implementation of the `CourseRepository` port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> CourseRepositoryError {
    match failure {
        DbFailure::Connection(message) => CourseRepositoryError::connection(message),
        DbFailure::Unique { field } => {
            CourseRepositoryError::query(format!("duplicate course {field}"))
        }
        DbFailure::ForeignKey => CourseRepositoryError::query("foreign key violation"),
        DbFailure::Query(message) => CourseRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> CourseRepositoryError {
    map_failure(classify_diesel_error(error))
}

/// Like [`map_diesel_error`], but a foreign key violation names `bootcamp`.
fn map_write_error(error: diesel::result::Error, bootcamp: BootcampId) -> CourseRepositoryError {
    match classify_diesel_error(error) {
        DbFailure::ForeignKey => CourseRepositoryError::missing_bootcamp(bootcamp),
        other => map_failure(other),
    }
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        query_optional!(
            self,
            courses::table,
            courses::id.eq(*id.as_uuid()),
            CourseRow => Course,
            map_failure
        )
    }

    async fn list(
        &self,
        bootcamp: Option<BootcampId>,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = courses::table
            .select(CourseRow::as_select())
            .order_by(courses::created_at.desc())
            .into_boxed();
        if let Some(bootcamp) = bootcamp {
            query = query.filter(courses::bootcamp_id.eq(*bootcamp.as_uuid()));
        }
        let rows: Vec<CourseRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(Course::try_from), CourseRepositoryError::query)
    }

    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let row = CourseRow::try_from(course).map_err(CourseRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(courses::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_write_error(error, course.bootcamp))
    }

    async fn update(&self, course: &Course) -> Result<bool, CourseRepositoryError> {
        let changes = CourseUpdate::try_from(course).map_err(CourseRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(courses::table.find(*course.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(courses::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
