//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, User, UserId};

use super::diesel_helpers::{
    DbFailure, classify_diesel_error, classify_pool_error, collect_rows, query_optional,
};
use super::models::{UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> UserRepositoryError {
    match failure {
        DbFailure::Connection(message) => UserRepositoryError::connection(message),
        DbFailure::Unique { field } => UserRepositoryError::duplicate(field),
        DbFailure::ForeignKey => UserRepositoryError::query("foreign key violation"),
        DbFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_failure(classify_diesel_error(error))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        query_optional!(
            self,
            users::table,
            users::id.eq(*id.as_uuid()),
            UserRow => User,
            map_failure
        )
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        query_optional!(
            self,
            users::table,
            users::email.eq(email.as_ref()),
            UserRow => User,
            map_failure
        )
    }

    async fn find_by_reset_digest(
        &self,
        digest: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        query_optional!(
            self,
            users::table,
            users::reset_token_digest.eq(digest),
            UserRow => User,
            map_failure
        )
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(User::try_from), UserRepositoryError::query)
    }

    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&UserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*user.id.as_uuid()))
            .set(&UserUpdate::from(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DbFailure::Connection("down".into()), UserRepositoryError::connection("down"))]
    #[case(DbFailure::Unique { field: "email".into() }, UserRepositoryError::duplicate("email"))]
    #[case(DbFailure::Query("bad".into()), UserRepositoryError::query("bad"))]
    fn failures_map_to_port_errors(
        #[case] failure: DbFailure,
        #[case] expected: UserRepositoryError,
    ) {
        assert_eq!(map_failure(failure), expected);
    }
}
