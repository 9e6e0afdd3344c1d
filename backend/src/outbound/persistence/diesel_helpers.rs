//! Shared error classification for the Diesel repositories.
//!
//! Pool and Diesel failures are first reduced to a [`DbFailure`], then each
//! repository maps that into its own port error.

use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to the cases repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// Pool checkout or a dropped connection.
    Connection(String),
    /// A unique constraint rejected the write; carries the offending column.
    Unique { field: String },
    /// A foreign key rejected the write.
    ForeignKey,
    /// Anything else.
    Query(String),
}

/// Classify a pool failure.
pub(crate) fn classify_pool_error(error: PoolError) -> DbFailure {
    DbFailure::Connection(error.into_message())
}

/// Classify a Diesel failure and emit debug context.
pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> DbFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = ?info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => DbFailure::Unique {
                field: constraint_field(info.constraint_name(), info.table_name()),
            },
            DatabaseErrorKind::ForeignKeyViolation => DbFailure::ForeignKey,
            DatabaseErrorKind::ClosedConnection => {
                DbFailure::Connection("database connection error".to_owned())
            }
            _ => DbFailure::Query("database error".to_owned()),
        },
        _ => DbFailure::Query("database error".to_owned()),
    }
}

/// Recover the column name from a `<table>_<column>_key` constraint.
fn constraint_field(constraint: Option<&str>, table: Option<&str>) -> String {
    let Some(constraint) = constraint else {
        return "value".to_owned();
    };
    let without_table = table
        .and_then(|table| constraint.strip_prefix(table))
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(constraint);
    without_table
        .strip_suffix("_key")
        .unwrap_or(without_table)
        .to_owned()
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Fetch at most one row matching `$filter` and convert it into `$entity`.
///
/// Expands inside an `async fn` of a repository holding a `pool: DbPool`;
/// every failure goes through `$map_failure`.
macro_rules! query_optional {
    (
        $self:ident,
        $table:expr,
        $filter:expr,
        $row_type:ty => $entity:ty,
        $map_failure:path
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::{
            DbFailure, classify_diesel_error, classify_pool_error,
        };

        let mut conn = $self
            .pool
            .get()
            .await
            .map_err(|error| $map_failure(classify_pool_error(error)))?;

        let row: Option<$row_type> = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|error| $map_failure(classify_diesel_error(error)))?;

        row.map(<$entity>::try_from)
            .transpose()
            .map_err(|message| $map_failure(DbFailure::Query(message)))
    }};
}

pub(crate) use query_optional;
