//! Request parsing shared by the HTTP handlers.
//!
//! Malformed path identifiers surface as `404 Not Found` so that clients
//! cannot distinguish them from unknown records. Malformed JSON bodies and
//! query strings surface as `400 Bad Request`.

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use futures_util::StreamExt as _;
use serde_json::json;

use crate::domain::{BootcampId, CourseId, Error, ListQuery, ReviewId, UserId};

macro_rules! path_id_parser {
    ($fn_name:ident, $id:ty, $noun:literal) => {
        pub(crate) fn $fn_name(raw: &str) -> Result<$id, Error> {
            <$id>::new(raw).map_err(|_| {
                Error::not_found(format!(concat!("No ", $noun, " with the id of {}"), raw))
            })
        }
    };
}

path_id_parser!(bootcamp_id, BootcampId, "bootcamp");
path_id_parser!(course_id, CourseId, "course");
path_id_parser!(review_id, ReviewId, "review");
path_id_parser!(user_id, UserId, "user");

/// Parse the query string into the list contract.
pub(crate) fn list_query(req: &HttpRequest) -> Result<ListQuery, Error> {
    ListQuery::parse(url::form_urlencoded::parse(req.query_string().as_bytes()).into_owned())
}

/// Parse the `{distance}` path segment of the radius search.
pub(crate) fn distance_km(raw: &str) -> Result<f64, Error> {
    raw.parse::<f64>()
        .ok()
        .filter(|distance| distance.is_finite())
        .ok_or_else(|| {
            Error::invalid_request("Distance must be a number of kilometres")
                .with_details(json!({ "field": "distance", "value": raw }))
        })
}

fn json_error(err: &JsonPayloadError) -> Error {
    match err {
        JsonPayloadError::ContentType => {
            Error::invalid_request("Request body must be application/json")
        }
        other => Error::invalid_request(format!("Malformed JSON body: {other}")),
    }
}

/// JSON extractor configuration rendering body errors in the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| json_error(&err).into())
}

/// Read at most `limit + 1` bytes of the request body; a result longer than
/// `limit` marks an oversized upload.
pub(crate) async fn read_body_capped(
    mut payload: web::Payload,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let cap = limit.saturating_add(1);
    let mut bytes = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|err| Error::invalid_request(format!("Problem reading upload: {err}")))?;
        let room = cap.saturating_sub(bytes.len());
        bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if bytes.len() >= cap {
            break;
        }
    }
    Ok(bytes)
}
