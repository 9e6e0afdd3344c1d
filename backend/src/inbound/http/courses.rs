//! Course handlers, top-level and nested under a bootcamp.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::CourseInput;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{CourseInputSchema, CourseSchema, ErrorEnvelopeSchema};
use crate::inbound::http::session::Identity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{bootcamp_id, course_id, list_query};

/// List every course.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Page of courses", body = [CourseSchema]),
        (status = 400, description = "Unknown field or malformed query", body = ErrorEnvelopeSchema),
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let query = list_query(&req)?;
    let page = state.courses.list(None, &query).await?;
    envelope::page(page, query.select())
}

/// List the courses of one bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/courses",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Page of the bootcamp's courses", body = [CourseSchema]),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["courses"],
    operation_id = "listBootcampCourses",
    security([])
)]
#[get("/bootcamps/{id}/courses")]
pub async fn list_bootcamp_courses(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let bootcamp = bootcamp_id(&path)?;
    let query = list_query(&req)?;
    let page = state.courses.list(Some(bootcamp), &query).await?;
    envelope::page(page, query.select())
}

/// Fetch one course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseSchema),
        (status = 404, description = "Unknown course", body = ErrorEnvelopeSchema),
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    let course = state.courses.get(&id).await?;
    Ok(envelope::ok(course))
}

/// Add a course to a bootcamp the caller owns.
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/courses",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = CourseInputSchema,
    responses(
        (status = 200, description = "Course created", body = CourseSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not the bootcamp owner", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["courses"],
    operation_id = "addCourse"
)]
#[post("/bootcamps/{id}/courses")]
pub async fn add_course(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<CourseInput>,
) -> ApiResult<HttpResponse> {
    let bootcamp = bootcamp_id(&path)?;
    let course = state
        .courses
        .create(&identity.actor(), &bootcamp, payload.into_inner())
        .await?;
    Ok(envelope::ok(course))
}

/// Update a course the caller owns.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = CourseInputSchema,
    responses(
        (status = 200, description = "Updated course", body = CourseSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not the owner", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown course", body = ErrorEnvelopeSchema),
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<CourseInput>,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    let course = state
        .courses
        .update(&identity.actor(), &id, payload.into_inner())
        .await?;
    Ok(envelope::ok(course))
}

/// Delete a course the caller owns.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Deleted; `data` is empty"),
        (status = 403, description = "Not the owner", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown course", body = ErrorEnvelopeSchema),
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    state.courses.delete(&identity.actor(), &id).await?;
    Ok(envelope::empty())
}
