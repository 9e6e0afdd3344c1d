//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{BootcampId, Review, ReviewId};

use super::diesel_helpers::{
    DbFailure, classify_diesel_error, classify_pool_error, collect_rows, query_optional,
};
use super::models::{ReviewRow, ReviewUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> ReviewRepositoryError {
    match failure {
        DbFailure::Connection(message) => ReviewRepositoryError::connection(message),
        DbFailure::Unique { field } => {
            ReviewRepositoryError::query(format!("duplicate review {field}"))
        }
        DbFailure::ForeignKey => ReviewRepositoryError::query("foreign key violation"),
        DbFailure::Query(message) => ReviewRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_failure(classify_diesel_error(error))
}

/// Like [`map_diesel_error`], but a foreign key violation names `bootcamp`.
fn map_write_error(error: diesel::result::Error, bootcamp: BootcampId) -> ReviewRepositoryError {
    match classify_diesel_error(error) {
        DbFailure::ForeignKey => ReviewRepositoryError::missing_bootcamp(bootcamp),
        other => map_failure(other),
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        query_optional!(
            self,
            reviews::table,
            reviews::id.eq(*id.as_uuid()),
            ReviewRow => Review,
            map_failure
        )
    }

    async fn list(
        &self,
        bootcamp: Option<BootcampId>,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = reviews::table
            .select(ReviewRow::as_select())
            .order_by(reviews::created_at.desc())
            .into_boxed();
        if let Some(bootcamp) = bootcamp {
            query = query.filter(reviews::bootcamp_id.eq(*bootcamp.as_uuid()));
        }
        let rows: Vec<ReviewRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(Review::try_from), ReviewRepositoryError::query)
    }

    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reviews::table)
            .values(&ReviewRow::from(review))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_write_error(error, review.bootcamp))
    }

    async fn update(&self, review: &Review) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(reviews::table.find(*review.id.as_uuid()))
            .set(&ReviewUpdate::from(review))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &ReviewId) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(reviews::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    struct ViolationInfo(&'static str);

    impl DatabaseErrorInformation for ViolationInfo {
        fn message(&self) -> &str {
            "violation"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("reviews")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn violation(kind: DatabaseErrorKind, constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(ViolationInfo(constraint)))
    }

    #[rstest]
    fn foreign_key_violation_names_the_bootcamp() {
        let bootcamp = BootcampId::random();
        let err = map_write_error(
            violation(
                DatabaseErrorKind::ForeignKeyViolation,
                "reviews_bootcamp_id_fkey",
            ),
            bootcamp,
        );
        assert_eq!(err, ReviewRepositoryError::missing_bootcamp(bootcamp));
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let err = map_diesel_error(violation(DatabaseErrorKind::ClosedConnection, "none"));
        assert!(matches!(err, ReviewRepositoryError::Connection { .. }));
    }
}
