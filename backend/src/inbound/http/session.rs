//! Request identity and the `token` cookie.
//!
//! Handlers that need a signed-in user take an [`Identity`] argument. The
//! extractor reads a bearer token from the `Authorization` header, falling
//! back to the `token` cookie, and resolves it through the auth service.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, Error, User};

use super::state::{CookieSettings, HttpState};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";
const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// Signed-in user resolved from the request token.
#[derive(Debug, Clone)]
pub struct Identity(User);

impl Identity {
    /// The authenticated user.
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Consume the identity, returning the user.
    pub fn into_user(self) -> User {
        self.0
    }

    /// Role and id used by the access rules.
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

fn cookie_token(req: &HttpRequest) -> Option<String> {
    req.cookie(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}

/// Token presented with the request, preferring the `Authorization` header.
pub(crate) fn request_token(req: &HttpRequest) -> Option<String> {
    bearer_token(req).or_else(|| cookie_token(req))
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = request_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token.ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED))?;
            state.auth.authenticate(&token).await.map(Identity)
        })
    }
}

/// Cookie holding `token` for the configured lifetime.
pub fn token_cookie(token: &str, settings: CookieSettings) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(settings.lifetime)
        .finish()
}

/// Cookie overwriting the token with an empty value that expires at once.
pub fn cleared_cookie(settings: CookieSettings) -> Cookie<'static> {
    let mut cookie = token_cookie("none", settings);
    cookie.make_removal();
    cookie
}
