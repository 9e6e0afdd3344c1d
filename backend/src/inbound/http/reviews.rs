//! Review handlers, top-level and nested under a bootcamp.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::ReviewInput;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{ReviewInputSchema, ReviewSchema, ErrorEnvelopeSchema};
use crate::inbound::http::session::Identity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{bootcamp_id, review_id, list_query};

/// List every review.
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    responses(
        (status = 200, description = "Page of reviews", body = [ReviewSchema]),
        (status = 400, description = "Unknown field or malformed query", body = ErrorEnvelopeSchema),
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/reviews")]
pub async fn list_reviews(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let query = list_query(&req)?;
    let page = state.reviews.list(None, &query).await?;
    envelope::page(page, query.select())
}

/// List the reviews of one bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/reviews",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Page of the bootcamp's reviews", body = [ReviewSchema]),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["reviews"],
    operation_id = "listBootcampReviews",
    security([])
)]
#[get("/bootcamps/{id}/reviews")]
pub async fn list_bootcamp_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let bootcamp = bootcamp_id(&path)?;
    let query = list_query(&req)?;
    let page = state.reviews.list(Some(bootcamp), &query).await?;
    envelope::page(page, query.select())
}

/// Fetch one review.
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review", body = ReviewSchema),
        (status = 404, description = "Unknown review", body = ErrorEnvelopeSchema),
    ),
    tags = ["reviews"],
    operation_id = "getReview",
    security([])
)]
#[get("/reviews/{id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = review_id(&path)?;
    let review = state.reviews.get(&id).await?;
    Ok(envelope::ok(review))
}

/// Review a bootcamp.
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/reviews",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = ReviewInputSchema,
    responses(
        (status = 201, description = "Review created", body = ReviewSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Role may not review", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["reviews"],
    operation_id = "addReview"
)]
#[post("/bootcamps/{id}/reviews")]
pub async fn add_review(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<ReviewInput>,
) -> ApiResult<HttpResponse> {
    let bootcamp = bootcamp_id(&path)?;
    let review = state
        .reviews
        .create(&identity.actor(), &bootcamp, payload.into_inner())
        .await?;
    Ok(envelope::created(review))
}

/// Update a review the caller wrote.
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    request_body = ReviewInputSchema,
    responses(
        (status = 200, description = "Updated review; 200 rather than 201", body = ReviewSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not the author", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown review", body = ErrorEnvelopeSchema),
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[put("/reviews/{id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<ReviewInput>,
) -> ApiResult<HttpResponse> {
    let id = review_id(&path)?;
    let review = state
        .reviews
        .update(&identity.actor(), &id, payload.into_inner())
        .await?;
    Ok(envelope::ok(review))
}

/// Delete a review the caller wrote.
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Deleted; 200 with body `{success: true, data: {}}` and no status field"),
        (status = 403, description = "Not the author", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown review", body = ErrorEnvelopeSchema),
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/reviews/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = review_id(&path)?;
    state.reviews.delete(&identity.actor(), &id).await?;
    Ok(envelope::empty())
}
