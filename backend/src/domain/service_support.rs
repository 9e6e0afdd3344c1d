//! Port error mapping shared by the domain services.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{
    BootcampRepositoryError, CourseRepositoryError, GeocoderError, MailerError, PasswordHasher,
    PasswordHasherError, PhotoStoreError, ReviewRepositoryError, TokenError, UserRepositoryError,
};
use crate::domain::{BootcampId, CourseId, Error, PasswordHash, ReviewId, TraceId, UserId};

const DUPLICATE_MESSAGE: &str = "Duplicate field value entered";

fn duplicate(field: String) -> Error {
    Error::conflict(DUPLICATE_MESSAGE).with_details(json!({ "field": field }))
}

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Duplicate { field } => duplicate(field),
    }
}

pub(crate) fn map_bootcamp_repository_error(error: BootcampRepositoryError) -> Error {
    match error {
        BootcampRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("bootcamp repository unavailable: {message}"))
        }
        BootcampRepositoryError::Query { message } => {
            Error::internal(format!("bootcamp repository error: {message}"))
        }
        BootcampRepositoryError::Duplicate { field } => duplicate(field),
    }
}

pub(crate) fn map_course_repository_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
        CourseRepositoryError::MissingBootcamp { id } => bootcamp_not_found(&id),
    }
}

pub(crate) fn map_review_repository_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewRepositoryError::MissingBootcamp { id } => bootcamp_not_found(&id),
    }
}

pub(crate) fn map_geocoder_error(error: GeocoderError) -> Error {
    match error {
        GeocoderError::NoMatch { query } => {
            Error::invalid_request(format!("Could not find a location for `{query}`"))
        }
        other => {
            warn!(error = %other, "geocoding failed");
            Error::service_unavailable("Geocoding service unavailable")
        }
    }
}

pub(crate) fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Invalid { .. } => Error::unauthorized("Not authorized to access this route"),
        TokenError::Signing { message } => {
            Error::internal(format!("token signing failed: {message}"))
        }
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Hash `password` on the blocking pool; key stretching is CPU bound.
pub(crate) async fn hash_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: Zeroizing<String>,
) -> Result<PasswordHash, Error> {
    let hasher = Arc::clone(hasher);
    TraceId::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(map_hasher_error)
}

/// Check `password` against `hash` on the blocking pool.
pub(crate) async fn verify_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: Zeroizing<String>,
    hash: PasswordHash,
) -> Result<bool, Error> {
    let hasher = Arc::clone(hasher);
    TraceId::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
        .map_err(map_hasher_error)
}

pub(crate) fn map_mailer_error(error: MailerError) -> Error {
    warn!(error = %error, "email delivery failed");
    Error::internal("Email could not be sent").exposed()
}

pub(crate) fn map_photo_store_error(error: PhotoStoreError) -> Error {
    warn!(error = %error, "photo storage failed");
    Error::internal("Problem with file upload").exposed()
}

pub(crate) fn bootcamp_not_found(id: &BootcampId) -> Error {
    Error::not_found(format!("No bootcamp with the id of {id}"))
}

pub(crate) fn course_not_found(id: &CourseId) -> Error {
    Error::not_found(format!("No course with the id of {id}"))
}

pub(crate) fn review_not_found(id: &ReviewId) -> Error {
    Error::not_found(format!("No review with the id of {id}"))
}

pub(crate) fn user_not_found(id: &UserId) -> Error {
    Error::not_found(format!("No user with the id of {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockPasswordHasher;
    use rstest::rstest;

    #[rstest]
    fn duplicates_become_conflicts_with_field_details() {
        let err = map_user_repository_error(UserRepositoryError::duplicate("email"));
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), DUPLICATE_MESSAGE);
        assert_eq!(err.details(), Some(&json!({ "field": "email" })));
    }

    #[rstest]
    #[case(BootcampRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(BootcampRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(BootcampRepositoryError::duplicate("name"), ErrorCode::Conflict)]
    fn bootcamp_errors_map_to_codes(#[case] error: BootcampRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(map_bootcamp_repository_error(error).code(), code);
    }

    #[rstest]
    fn missing_parent_bootcamp_is_not_found() {
        let id = BootcampId::random();
        let err = map_course_repository_error(CourseRepositoryError::missing_bootcamp(id));
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), format!("No bootcamp with the id of {id}"));
    }

    #[rstest]
    fn geocoder_outage_is_unavailable_but_no_match_is_invalid() {
        assert_eq!(
            map_geocoder_error(GeocoderError::transport("timeout")).code(),
            ErrorCode::ServiceUnavailable
        );
        assert_eq!(
            map_geocoder_error(GeocoderError::no_match("00000")).code(),
            ErrorCode::InvalidRequest
        );
    }

    #[tokio::test]
    async fn hashing_runs_off_the_calling_task_with_its_trace_id() {
        let trace_id = TraceId::generate();
        let mut mock = MockPasswordHasher::new();
        mock.expect_hash().returning(move |password| {
            assert_eq!(TraceId::current(), Some(trace_id));
            Ok(PasswordHash::new(format!("hash:{password}")))
        });
        let hasher: Arc<dyn PasswordHasher> = Arc::new(mock);

        let hash = TraceId::scope(
            trace_id,
            hash_password(&hasher, Zeroizing::new("123456".to_owned())),
        )
        .await
        .expect("hashed");
        assert_eq!(hash.as_str(), "hash:123456");
    }

    #[tokio::test]
    async fn verification_failures_are_internal() {
        let mut mock = MockPasswordHasher::new();
        mock.expect_verify()
            .returning(|_, _| Err(PasswordHasherError::malformed("bad salt")));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(mock);

        let err = verify_password(
            &hasher,
            Zeroizing::new("123456".to_owned()),
            PasswordHash::new("garbage"),
        )
        .await
        .expect_err("malformed hash");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn invalid_tokens_are_unauthenticated() {
        let err = map_token_error(TokenError::invalid("expired"));
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
