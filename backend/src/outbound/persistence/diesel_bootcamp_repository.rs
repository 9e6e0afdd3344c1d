//! PostgreSQL-backed `BootcampRepository` implementation using Diesel ORM.
//!
//! The radius query narrows candidates to a latitude band in SQL, then
//! applies the exact haversine test from the domain. Deleting a bootcamp
//! removes its courses and reviews in the same transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BootcampRepository, BootcampRepositoryError};
use crate::domain::{Bootcamp, BootcampId, GeoPoint, Radius, UserId};

use super::diesel_helpers::{
    DbFailure, classify_diesel_error, classify_pool_error, collect_rows, query_optional,
};
use super::models::{BootcampRow, BootcampUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{bootcamps, courses, reviews};

/// Diesel-backed implementation of the `BootcampRepository` port.
#[derive(Clone)]
pub struct DieselBootcampRepository {
    pool: DbPool,
}

impl DieselBootcampRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_bootcamps(rows: Vec<BootcampRow>) -> Result<Vec<Bootcamp>, BootcampRepositoryError> {
    collect_rows(
        rows.into_iter().map(Bootcamp::try_from),
        BootcampRepositoryError::query,
    )
}

fn map_failure(failure: DbFailure) -> BootcampRepositoryError {
    match failure {
        DbFailure::Connection(message) => BootcampRepositoryError::connection(message),
        DbFailure::Unique { field } => BootcampRepositoryError::duplicate(field),
        DbFailure::ForeignKey => BootcampRepositoryError::query("foreign key violation"),
        DbFailure::Query(message) => BootcampRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> BootcampRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> BootcampRepositoryError {
    map_failure(classify_diesel_error(error))
}

/// Latitude band, in degrees, that contains every point within `radius`
/// of `centre`.
fn latitude_band(centre: &GeoPoint, radius: Radius) -> (f64, f64) {
    let span = radius.radians().to_degrees();
    (
        (centre.latitude - span).max(-90.0),
        (centre.latitude + span).min(90.0),
    )
}

#[async_trait]
impl BootcampRepository for DieselBootcampRepository {
    async fn find_by_id(
        &self,
        id: &BootcampId,
    ) -> Result<Option<Bootcamp>, BootcampRepositoryError> {
        query_optional!(
            self,
            bootcamps::table,
            bootcamps::id.eq(*id.as_uuid()),
            BootcampRow => Bootcamp,
            map_failure
        )
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<Bootcamp>, BootcampRepositoryError> {
        query_optional!(
            self,
            bootcamps::table,
            bootcamps::user_id.eq(*owner.as_uuid()),
            BootcampRow => Bootcamp,
            map_failure
        )
    }

    async fn list(&self) -> Result<Vec<Bootcamp>, BootcampRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BootcampRow> = bootcamps::table
            .select(BootcampRow::as_select())
            .order_by(bootcamps::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_bootcamps(rows)
    }

    async fn within_radius(
        &self,
        centre: &GeoPoint,
        radius: Radius,
    ) -> Result<Vec<Bootcamp>, BootcampRepositoryError> {
        let (south, north) = latitude_band(centre, radius);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BootcampRow> = bootcamps::table
            .filter(bootcamps::latitude.between(south, north))
            .select(BootcampRow::as_select())
            .order_by(bootcamps::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let candidates = rows.len();
        let matches: Vec<Bootcamp> = into_bootcamps(rows)?
            .into_iter()
            .filter(|bootcamp| radius.contains(centre, &bootcamp.location.point))
            .collect();
        debug!(
            latitude = centre.latitude,
            longitude = centre.longitude,
            radians = radius.radians(),
            candidates,
            matches = matches.len(),
            "radius query"
        );
        Ok(matches)
    }

    async fn create(&self, bootcamp: &Bootcamp) -> Result<(), BootcampRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(bootcamps::table)
            .values(&BootcampRow::from(bootcamp))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, bootcamp: &Bootcamp) -> Result<bool, BootcampRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(bootcamps::table.find(*bootcamp.id.as_uuid()))
            .set(&BootcampUpdate::from(bootcamp))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_cascade(&self, id: &BootcampId) -> Result<bool, BootcampRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let bootcamp_id: Uuid = *id.as_uuid();
        delete_with_children(&mut conn, bootcamp_id).await
    }
}

async fn delete_with_children(
    conn: &mut AsyncPgConnection,
    bootcamp_id: Uuid,
) -> Result<bool, BootcampRepositoryError> {
    conn.transaction(|conn| {
        async move {
            let courses_removed =
                diesel::delete(courses::table.filter(courses::bootcamp_id.eq(bootcamp_id)))
                    .execute(conn)
                    .await?;
            let reviews_removed =
                diesel::delete(reviews::table.filter(reviews::bootcamp_id.eq(bootcamp_id)))
                    .execute(conn)
                    .await?;
            let removed = diesel::delete(bootcamps::table.find(bootcamp_id))
                .execute(conn)
                .await?;
            debug!(
                %bootcamp_id,
                courses_removed,
                reviews_removed,
                "bootcamp cascade delete"
            );
            Ok::<_, diesel::result::Error>(removed > 0)
        }
        .scope_boxed()
    })
    .await
    .map_err(map_diesel_error)
}
