use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::config::Allowlist;
use crate::cookies::SESSION_COOKIE;
use crate::error::ApiError;
use crate::models::session::SessionUser;
use crate::services::session_service::SessionService;

/// Extension type to store the signed-in user in the request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub SessionUser);

/// Resolves the session cookie to an allowlisted user
#[derive(Clone)]
pub struct AccessGuard {
    session_service: Arc<dyn SessionService>,
    allowlist: Arc<Allowlist>,
}

impl AccessGuard {
    pub fn new(session_service: Arc<dyn SessionService>, allowlist: Arc<Allowlist>) -> Self {
        Self {
            session_service,
            allowlist,
        }
    }

    /// `Unauthorized` without a valid session; `Forbidden` when the session
    /// belongs to an email that is no longer allowlisted
    pub fn require_user(&self, jar: &CookieJar) -> Result<SessionUser, ApiError> {
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::unauthorized("not signed in"))?;

        let user = self
            .session_service
            .verify(token)
            .ok_or_else(|| ApiError::unauthorized("session is invalid or expired"))?;

        if !self.allowlist.contains(&user.email) {
            tracing::warn!(email = %user.email, "session for an email outside the allowlist");
            return Err(ApiError::forbidden("email is not allowed"));
        }

        Ok(user)
    }
}

/// Auth middleware that checks the session cookie and adds the user to request extensions
pub async fn auth_middleware(
    State(guard): State<AccessGuard>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = guard.require_user(&jar)?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_service::JwtSessionService;
    use axum::{
        Extension, Json, Router,
        body::Body,
        http::{Request, StatusCode, header},
        middleware,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;
    use tower::ServiceExt;

    // Test handler that requires authentication
    async fn protected_handler(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
        Json(json!({
            "email": user.0.email,
            "message": "Access granted"
        }))
    }

    fn create_test_app(session_service: Arc<dyn SessionService>, allowed: &str) -> Router {
        let guard = AccessGuard::new(session_service, Arc::new(Allowlist::parse(allowed)));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(guard, auth_middleware))
    }

    fn token_for(session_service: &JwtSessionService, email: &str) -> String {
        session_service
            .issue(&SessionUser::new(email, None))
            .unwrap()
            .token
    }

    async fn send(app: Router, cookie: Option<String>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri("/protected");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_middleware_with_valid_session() {
        let session_service = Arc::new(JwtSessionService::new("test_secret"));
        let token = token_for(&session_service, "user@x.com");
        let app = create_test_app(session_service, "User@X.com");

        let (status, body) = send(app, Some(format!("{}={}", SESSION_COOKIE, token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "user@x.com");
        assert_eq!(body["message"], "Access granted");
    }

    #[tokio::test]
    async fn test_middleware_without_cookie() {
        let app = create_test_app(Arc::new(JwtSessionService::new("test_secret")), "user@x.com");

        let (status, body) = send(app, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "not signed in");
    }

    #[tokio::test]
    async fn test_middleware_with_invalid_token() {
        let app = create_test_app(Arc::new(JwtSessionService::new("test_secret")), "user@x.com");

        let (status, _) = send(app, Some(format!("{}=invalid_token_here", SESSION_COOKIE))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_middleware_with_token_from_other_secret() {
        let other = JwtSessionService::new("other_secret");
        let token = token_for(&other, "user@x.com");
        let app = create_test_app(Arc::new(JwtSessionService::new("test_secret")), "user@x.com");

        let (status, _) = send(app, Some(format!("{}={}", SESSION_COOKIE, token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_middleware_rejects_email_outside_allowlist() {
        let session_service = Arc::new(JwtSessionService::new("test_secret"));
        let token = token_for(&session_service, "former@x.com");
        let app = create_test_app(session_service, "user@x.com");

        let (status, _) = send(app, Some(format!("{}={}", SESSION_COOKIE, token))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
