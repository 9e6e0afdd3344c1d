//! Bootcamp handlers.
//!
//! ```text
//! GET    /api/v1/bootcamps?averageCost[lte]=10000&select=name&sort=-name
//! GET    /api/v1/bootcamps/radius/02118/10
//! GET    /api/v1/bootcamps/{id}
//! POST   /api/v1/bootcamps
//! PUT    /api/v1/bootcamps/{id}
//! DELETE /api/v1/bootcamps/{id}
//! PUT    /api/v1/bootcamps/{id}/photo
//! ```

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::{BootcampInput, PhotoUpload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{
    BootcampInputSchema, BootcampSchema, ErrorEnvelopeSchema,
};
use crate::inbound::http::session::Identity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{bootcamp_id, distance_km, list_query, read_body_capped};

/// List bootcamps through the filter, sort, select and page contract.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated keys; `-` for descending"),
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100"),
    ),
    responses(
        (status = 200, description = "Page of bootcamps", body = [BootcampSchema]),
        (status = 400, description = "Unknown field or malformed query", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "listBootcamps",
    security([])
)]
#[get("/bootcamps")]
pub async fn list_bootcamps(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let query = list_query(&req)?;
    let page = state.bootcamps.list(&query).await?;
    envelope::page(page, query.select())
}

/// Bootcamps within `distance` kilometres of a postal code.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/radius/{zipcode}/{distance}",
    params(
        ("zipcode" = String, Path, description = "Postal code at the centre"),
        ("distance" = f64, Path, description = "Radius in kilometres"),
    ),
    responses(
        (status = 200, description = "Matching bootcamps with `count`", body = [BootcampSchema]),
        (status = 400, description = "Invalid distance or unknown postal code", body = ErrorEnvelopeSchema),
        (status = 503, description = "Geocoder unavailable", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "bootcampsInRadius",
    security([])
)]
#[get("/bootcamps/radius/{zipcode}/{distance}")]
pub async fn bootcamps_in_radius(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (zipcode, distance) = path.into_inner();
    let distance = distance_km(&distance)?;
    let found = state.bootcamps.within_radius(&zipcode, distance).await?;
    Ok(envelope::counted(found))
}

/// Fetch one bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Bootcamp", body = BootcampSchema),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "getBootcamp",
    security([])
)]
#[get("/bootcamps/{id}")]
pub async fn get_bootcamp(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = bootcamp_id(&path)?;
    let bootcamp = state.bootcamps.get(&id).await?;
    Ok(envelope::ok(bootcamp))
}

/// Publish a bootcamp owned by the caller.
///
/// Publishers may own one bootcamp; admins any number.
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps",
    request_body = BootcampInputSchema,
    responses(
        (status = 201, description = "Bootcamp created", body = BootcampSchema),
        (status = 400, description = "Validation failed, duplicate name or already published", body = ErrorEnvelopeSchema),
        (status = 401, description = "Not signed in", body = ErrorEnvelopeSchema),
        (status = 403, description = "Role may not publish", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "createBootcamp"
)]
#[post("/bootcamps")]
pub async fn create_bootcamp(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<BootcampInput>,
) -> ApiResult<HttpResponse> {
    let bootcamp = state
        .bootcamps
        .create(&identity.actor(), payload.into_inner())
        .await?;
    Ok(envelope::created(bootcamp))
}

/// Update a bootcamp the caller owns.
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = BootcampInputSchema,
    responses(
        (status = 200, description = "Updated bootcamp", body = BootcampSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not the owner", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "updateBootcamp"
)]
#[put("/bootcamps/{id}")]
pub async fn update_bootcamp(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<BootcampInput>,
) -> ApiResult<HttpResponse> {
    let id = bootcamp_id(&path)?;
    let bootcamp = state
        .bootcamps
        .update(&identity.actor(), &id, payload.into_inner())
        .await?;
    Ok(envelope::ok(bootcamp))
}

/// Delete a bootcamp with its courses and reviews.
#[utoipa::path(
    delete,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Deleted; 200 with body `{success: true, data: {}}` and no status field"),
        (status = 403, description = "Not the owner", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "deleteBootcamp"
)]
#[delete("/bootcamps/{id}")]
pub async fn delete_bootcamp(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = bootcamp_id(&path)?;
    state.bootcamps.delete(&identity.actor(), &id).await?;
    Ok(envelope::empty())
}

/// Upload the bootcamp photo as the raw request body.
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}/photo",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body(content = Vec<u8>, content_type = "image/*", description = "Image bytes"),
    responses(
        (status = 200, description = "Stored; `data` is the file name", body = String),
        (status = 400, description = "Missing, non-image or oversized upload", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not the owner", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown bootcamp", body = ErrorEnvelopeSchema),
    ),
    tags = ["bootcamps"],
    operation_id = "uploadBootcampPhoto"
)]
#[put("/bootcamps/{id}/photo")]
pub async fn upload_bootcamp_photo(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let id = bootcamp_id(&path)?;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = read_body_capped(payload, state.bootcamps.max_photo_bytes()).await?;
    let file_name = state
        .bootcamps
        .upload_photo(&identity.actor(), &id, PhotoUpload { content_type, bytes })
        .await?;
    Ok(envelope::ok(file_name))
}
