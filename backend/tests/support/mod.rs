//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`;
//! each one pulls this module in with `mod support;`. The helpers drive the
//! assembled application through `actix_web::test` and decode envelopes
//! into `serde_json::Value` so assertions read like the wire format.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

pub const PASSWORD: &str = "123456";

/// Send `req` and decode the JSON body; an empty body decodes to `null`.
pub async fn send<S, B>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, json)
}

/// Attach a bearer token.
pub fn authed(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((AUTHORIZATION, format!("Bearer {token}")))
}

/// Register through the public endpoint and return the bearer token.
pub async fn register<S, B>(app: &S, name: &str, email: &str, role: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "name": name,
            "email": email,
            "password": PASSWORD,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {email}: {body}");
    token_of(&body)
}

/// Sign in and return the bearer token.
pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": email, "password": password })),
    )
    .await
}

pub fn token_of(body: &Value) -> String {
    body["token"].as_str().expect("token in body").to_owned()
}

/// Minimal valid bootcamp payload located at `zipcode`.
pub fn bootcamp_payload(name: &str, zipcode: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} teaches full stack web development"),
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": zipcode,
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true,
        "averageCost": 10000,
    })
}

/// Create a bootcamp as `token` and return its id.
pub async fn create_bootcamp<S, B>(app: &S, token: &str, name: &str, zipcode: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        authed(
            TestRequest::post()
                .uri("/api/v1/bootcamps")
                .set_json(bootcamp_payload(name, zipcode)),
            token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create {name}: {body}");
    body["data"]["id"].as_str().expect("bootcamp id").to_owned()
}

pub fn course_payload(title: &str, tuition: u32) -> Value {
    json!({
        "title": title,
        "description": format!("{title} from the ground up"),
        "weeks": 8,
        "tuition": tuition,
        "minimumSkill": "beginner",
        "scholarshipAvailable": false,
    })
}

/// Add a course as `token` and return its id.
pub async fn add_course<S, B>(app: &S, token: &str, bootcamp: &str, title: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        authed(
            TestRequest::post()
                .uri(&format!("/api/v1/bootcamps/{bootcamp}/courses"))
                .set_json(course_payload(title, 8000)),
            token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add course {title}: {body}");
    body["data"]["id"].as_str().expect("course id").to_owned()
}

/// Review a bootcamp as `token` and return the review id.
pub async fn add_review<S, B>(app: &S, token: &str, bootcamp: &str, rating: u8) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        authed(
            TestRequest::post()
                .uri(&format!("/api/v1/bootcamps/{bootcamp}/reviews"))
                .set_json(json!({
                    "title": "Learned a ton",
                    "text": "Great instructors and a friendly cohort.",
                    "rating": rating,
                })),
            token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add review: {body}");
    body["data"]["id"].as_str().expect("review id").to_owned()
}

/// Assert the failure envelope shape and return the message.
pub fn expect_failure(body: &Value, code: &str) -> String {
    assert_eq!(body["success"], Value::Bool(false), "{body}");
    assert_eq!(body["code"], Value::String(code.to_owned()), "{body}");
    body["error"].as_str().expect("error message").to_owned()
}
