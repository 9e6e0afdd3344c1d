//! Admin-only user administration.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! POST   /api/v1/users {"name":"Jane","email":"jane@gmail.com","password":"123456","role":"admin"}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::{UserDraft, UserPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{
    ErrorEnvelopeSchema, UserDraftSchema, UserPatchSchema, UserSchema,
};
use crate::inbound::http::session::Identity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{list_query, user_id};

/// List users through the list contract.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Page of users", body = [UserSchema]),
        (status = 401, description = "Not signed in", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    identity: Identity,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let query = list_query(&req)?;
    let page = state.users.list(&identity.actor(), &query).await?;
    envelope::page(page, query.select())
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown user", body = ErrorEnvelopeSchema),
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let user = state.users.get(&identity.actor(), &id).await?;
    Ok(envelope::ok(user))
}

/// Create an account with any role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserDraftSchema,
    responses(
        (status = 201, description = "User created", body = UserSchema),
        (status = 400, description = "Validation failed or duplicate email", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<UserDraft>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .create(&identity.actor(), payload.into_inner())
        .await?;
    Ok(envelope::created(user))
}

/// Update name, email or role.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserPatchSchema,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown user", body = ErrorEnvelopeSchema),
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<UserPatch>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let user = state
        .users
        .update(&identity.actor(), &id, payload.into_inner())
        .await?;
    Ok(envelope::ok(user))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted; `data` is empty"),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown user", body = ErrorEnvelopeSchema),
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    state.users.delete(&identity.actor(), &id).await?;
    Ok(envelope::empty())
}
