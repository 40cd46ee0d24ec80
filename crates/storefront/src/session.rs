//! Shopper session extractors.
//!
//! The sign-in pages (served elsewhere) leave a `user` cookie holding the
//! URL-encoded JSON of the signed-in user, e.g. `%7B%22id%22%3A%22u1%22%7D`.
//! Only the `id` field matters here. A missing or unreadable cookie means
//! nobody is signed in.

use almed_core::SessionUser;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::error::set_sentry_user;

/// Name of the session cookie.
pub const USER_COOKIE: &str = "user";

/// Where unauthenticated shoppers are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where shoppers unknown to the marketplace are sent.
pub const REGISTER_PATH: &str = "/register";

/// Read the signed-in user from the request's cookies.
#[must_use]
pub fn current_user(jar: &CookieJar) -> Option<SessionUser> {
    let cookie = jar.get(USER_COOKIE)?;
    parse_user_cookie(cookie.value())
}

/// Decode a `user` cookie value.
#[must_use]
pub fn parse_user_cookie(value: &str) -> Option<SessionUser> {
    let decoded = urlencoding::decode(value).ok()?;
    match serde_json::from_str::<SessionUser>(&decoded) {
        Ok(user) if !user.id.as_str().trim().is_empty() => Some(user),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable user cookie");
            None
        }
    }
}

/// Expire the `user` cookie.
#[must_use]
pub fn clear_user_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(USER_COOKIE).path("/"))
}

/// Extractor that requires a signed-in shopper.
///
/// Without one, the request is redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> String {
///     format!("cart for {}", user.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser(pub SessionUser);

/// Rejection when a signed-in shopper is required but absent: a redirect
/// to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let user = current_user(&jar).ok_or(AuthRejection)?;

        set_sentry_user(&user.id, None);
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the signed-in shopper. Never rejects.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self(current_user(&jar)))
    }
}
