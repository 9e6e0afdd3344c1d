//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

async fn body_of(error: &Error) -> Value {
    let response = ResponseError::error_response(error);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error envelope is JSON")
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::conflict("already published"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
#[actix_web::test]
async fn failures_render_the_error_envelope(expected_trace_id: String) {
    let error = Error::invalid_request("Please add a name")
        .with_details(json!({ "fields": [{ "field": "name" }] }))
        .with_trace_id(expected_trace_id.clone());

    let response = ResponseError::error_response(&error);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(header.as_deref(), Some(TRACE_ID));

    let body = body_of(&error).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Please add a name"));
    assert_eq!(body["code"], json!("invalid_request"));
    assert_eq!(body["traceId"], json!(expected_trace_id));
    assert_eq!(body["details"]["fields"][0]["field"], json!("name"));
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("connection string postgres://secret")
        .with_details(json!({ "secret": "x" }))
        .with_trace_id(expected_trace_id.clone());

    let body = body_of(&error).await;
    assert_eq!(body["error"], json!(REDACTED_MESSAGE));
    assert!(body.get("details").is_none());
    assert_eq!(body["traceId"], json!(expected_trace_id));
}

#[rstest]
#[actix_web::test]
async fn missing_trace_id_omits_header_and_field() {
    let error = Error::not_found("No bootcamp with the id of 1");
    let response = ResponseError::error_response(&error);
    assert!(response.headers().get(TRACE_ID_HEADER).is_none());
    let body = body_of(&error).await;
    assert!(body.get("traceId").is_none());
}

#[actix_web::test]
async fn exposed_internal_errors_keep_their_message() {
    let error = Error::internal("Email could not be sent").exposed();

    assert_eq!(
        ResponseError::status_code(&error),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    let body = body_of(&error).await;
    assert_eq!(body["error"], json!("Email could not be sent"));
    assert_eq!(body["code"], json!("internal_error"));
}
