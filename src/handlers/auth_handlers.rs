use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::cookies::{CookieSettings, OAUTH_STATE_COOKIE};
use crate::error::{ApiError, ErrorResponse};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::oauth::CallbackQuery;
use crate::models::session::MeResponse;
use crate::services::oauth_service::OAuthService;
use crate::services::session_service::SessionService;

/// Where the browser lands after a successful sign-in
pub const SIGNED_IN_REDIRECT: &str = "/";

/// Where the browser lands after any failed sign-in
pub const SIGN_IN_FAILED_REDIRECT: &str = "/?auth=error";

/// A 302 Found redirect
fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}

/// Handler starting the Google sign-in
///
/// Stores a fresh CSRF state in a short-lived cookie and redirects to Google.
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 302, description = "Redirect to the Google consent screen"),
        (status = 500, description = "Google sign-in is not configured", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn google_begin_handler(
    State(oauth_service): State<Arc<dyn OAuthService>>,
    State(cookies): State<CookieSettings>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), ApiError> {
    let authorization = oauth_service.begin()?;

    let jar = jar.add(cookies.oauth_state(authorization.state));
    Ok((jar, found(authorization.url)))
}

/// Handler for the Google callback
///
/// Always redirects: to `/` with a session cookie on success, to
/// `/?auth=error` otherwise. The CSRF state cookie is cleared either way.
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to the application, with a session cookie on success")
    ),
    tag = "auth"
)]
pub async fn google_callback_handler(
    State(oauth_service): State<Arc<dyn OAuthService>>,
    State(session_service): State<Arc<dyn SessionService>>,
    State(cookies): State<CookieSettings>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    jar: CookieJar,
) -> (CookieJar, Response) {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let jar = jar.add(cookies.cleared_oauth_state());

    let outcome = match oauth_service
        .complete(&query, expected_state.as_deref())
        .await
    {
        Ok(user) => session_service.issue(&user),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(session) => {
            let jar = jar.add(cookies.session(session.token));
            (jar, found(SIGNED_IN_REDIRECT))
        }
        Err(e) => {
            tracing::warn!(status = %e.status(), error = %e, "google sign-in failed");
            (jar, found(SIGN_IN_FAILED_REDIRECT))
        }
    }
}

/// Handler for logout
///
/// Clears the session cookie. The token itself stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(cookies): State<CookieSettings>,
    jar: CookieJar,
) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, jar.add(cookies.cleared_session()))
}

/// Handler returning the signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The signed-in user", body = MeResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "auth"
)]
pub async fn me_handler(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<MeResponse> {
    Json(MeResponse { user })
}
