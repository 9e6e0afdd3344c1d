//! Account and session handlers under `/api/v1/auth`.
//!
//! Sign-in style endpoints answer `{ success, token, data }` and set the
//! `token` cookie.

use actix_web::{HttpResponse, get, post, put, web};
use serde::Serialize;
use tracing::warn;

use crate::domain::{
    ForgotPasswordInput, LoginInput, PasswordChange, ResetPasswordInput, Session, User, UserDraft,
    UserPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{
    ErrorEnvelopeSchema, ForgotPasswordSchema, LoginRequestSchema, PasswordChangeSchema,
    ResetPasswordSchema, TokenResponseSchema, UserDraftSchema, UserPatchSchema, UserSchema,
};
use crate::inbound::http::session::{Identity, cleared_cookie, token_cookie};
use crate::inbound::http::state::{CookieSettings, HttpState};

#[derive(Serialize)]
struct TokenResponse<'a> {
    success: bool,
    token: &'a str,
    data: &'a User,
}

fn session_response(session: &Session, cookies: CookieSettings) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(token_cookie(&session.token.token, cookies))
        .json(TokenResponse {
            success: true,
            token: &session.token.token,
            data: &session.user,
        })
}

/// Register a `user` or `publisher` account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = UserDraftSchema,
    responses(
        (status = 200, description = "Registered and signed in", body = TokenResponseSchema,
            headers(("Set-Cookie" = String, description = "`token` cookie"))),
        (status = 400, description = "Validation failed, admin role requested or duplicate email", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<UserDraft>,
) -> ApiResult<HttpResponse> {
    let session = state.auth.register(payload.into_inner()).await?;
    Ok(session_response(&session, state.cookies))
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestSchema,
    responses(
        (status = 200, description = "Signed in", body = TokenResponseSchema,
            headers(("Set-Cookie" = String, description = "`token` cookie"))),
        (status = 400, description = "Email or password missing", body = ErrorEnvelopeSchema),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginInput>,
) -> ApiResult<HttpResponse> {
    let session = state.auth.login(payload.into_inner()).await?;
    Ok(session_response(&session, state.cookies))
}

/// Current user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Signed-in user", body = UserSchema),
        (status = 401, description = "Not signed in", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(identity: Identity) -> HttpResponse {
    envelope::ok(identity.into_user())
}

/// Clear the `token` cookie.
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Cookie cleared; `data` is empty")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[get("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    let mut response = envelope::empty();
    if let Err(error) = response.add_cookie(&cleared_cookie(state.cookies)) {
        warn!(%error, "failed to clear token cookie");
    }
    response
}

/// Change the current user's name or email.
#[utoipa::path(
    put,
    path = "/api/v1/auth/updatedetails",
    request_body = UserPatchSchema,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Validation failed or duplicate email", body = ErrorEnvelopeSchema),
        (status = 401, description = "Not signed in", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "updateDetails"
)]
#[put("/auth/updatedetails")]
pub async fn update_details(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<UserPatch>,
) -> ApiResult<HttpResponse> {
    let user = state
        .auth
        .update_details(&identity.actor(), payload.into_inner())
        .await?;
    Ok(envelope::ok(user))
}

/// Change the current user's password and issue a fresh token.
#[utoipa::path(
    put,
    path = "/api/v1/auth/updatepassword",
    request_body = PasswordChangeSchema,
    responses(
        (status = 200, description = "Password changed", body = TokenResponseSchema),
        (status = 400, description = "New password invalid", body = ErrorEnvelopeSchema),
        (status = 401, description = "Current password incorrect", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "updatePassword"
)]
#[put("/auth/updatepassword")]
pub async fn update_password(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<PasswordChange>,
) -> ApiResult<HttpResponse> {
    let session = state
        .auth
        .update_password(&identity.actor(), payload.into_inner())
        .await?;
    Ok(session_response(&session, state.cookies))
}

/// Email a password reset link.
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgotpassword",
    request_body = ForgotPasswordSchema,
    responses(
        (status = 200, description = "Reset email sent", body = String),
        (status = 404, description = "No user with that email", body = ErrorEnvelopeSchema),
        (status = 500, description = "Email could not be sent", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/auth/forgotpassword")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordInput>,
) -> ApiResult<HttpResponse> {
    state.auth.forgot_password(payload.into_inner()).await?;
    Ok(envelope::ok("Email sent"))
}

/// Set a new password with a mailed reset token.
#[utoipa::path(
    put,
    path = "/api/v1/auth/resetpassword/{resettoken}",
    params(("resettoken" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordSchema,
    responses(
        (status = 200, description = "Password reset and signed in", body = TokenResponseSchema),
        (status = 400, description = "Invalid or expired token, or invalid password", body = ErrorEnvelopeSchema),
    ),
    tags = ["auth"],
    operation_id = "resetPassword",
    security([])
)]
#[put("/auth/resetpassword/{resettoken}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordInput>,
) -> ApiResult<HttpResponse> {
    let session = state
        .auth
        .reset_password(&path, payload.into_inner())
        .await?;
    Ok(session_response(&session, state.cookies))
}
