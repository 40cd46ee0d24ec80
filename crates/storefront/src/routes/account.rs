//! Account route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{Result, clear_sentry_user};
use crate::session::{LOGIN_PATH, REGISTER_PATH, RequireUser, clear_user_cookie};
use crate::state::AppState;

/// Profile view.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar letter.
    pub initial: Option<char>,
}

/// Display the signed-in shopper's profile.
///
/// A cookie naming a user the marketplace does not know is cleared and the
/// shopper is sent to register.
#[instrument(skip(state, user, jar), fields(user_id = %user.0.id))]
pub async fn show(
    State(state): State<AppState>,
    user: RequireUser,
    jar: CookieJar,
) -> Result<Response> {
    match state.api().user(&user.0.id).await {
        Ok(profile) => Ok(Json(AccountView {
            id: profile.id.to_string(),
            initial: profile.initial(),
            name: profile.name,
            email: profile.email,
        })
        .into_response()),
        Err(ApiError::NotFound(_)) => {
            tracing::info!("Unknown user in session cookie, sending to register");
            clear_sentry_user();
            Ok((clear_user_cookie(jar), Redirect::to(REGISTER_PATH)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Sign out.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    clear_sentry_user();
    (clear_user_cookie(jar), Redirect::to(LOGIN_PATH))
}
