//! Route guard for authenticated endpoints

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::api::types::ApiError;
use crate::core::constants::{DEFAULT_MEMBER_ID, SESSION_COOKIE_NAME};

use super::AuthManager;

/// Shared state for the auth guard
#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthManager>,
}

/// Member identity attached to authenticated requests
#[derive(Debug, Clone)]
pub struct SessionMember(pub String);

/// Require a valid session cookie on guarded routes.
///
/// With auth disabled the guard passes everything through under the
/// default member identity.
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth.enabled() {
        req.extensions_mut()
            .insert(SessionMember(DEFAULT_MEMBER_ID.to_string()));
        return Ok(next.run(req).await);
    }

    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return Err(ApiError::unauthorized(
            "NO_SESSION",
            "Authentication required",
        ));
    };

    let claims = state.auth.validate(cookie.value()).map_err(|e| {
        tracing::debug!(error = %e, "Session validation failed");
        ApiError::unauthorized("INVALID_SESSION", "Session is invalid or expired")
    })?;

    req.extensions_mut()
        .insert(SessionMember(claims.sub.clone()));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use axum::routing::get;
    use axum::{Extension, Router, middleware};
    use tower::ServiceExt;

    async fn whoami(Extension(member): Extension<SessionMember>) -> String {
        member.0
    }

    fn app(auth: Arc<AuthManager>) -> Router {
        let state = AuthState { auth };
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state, require_auth))
    }

    #[tokio::test]
    async fn test_missing_cookie_rejected() {
        let app = app(Arc::new(AuthManager::for_test(true)));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_cookie_passes_identity() {
        let auth = Arc::new(AuthManager::for_test(true));
        let token = auth.create_session("m42", "otp").unwrap();
        let app = app(auth);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(
                        header::COOKIE,
                        format!("{}={}", SESSION_COOKIE_NAME, token),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"m42");
    }

    #[tokio::test]
    async fn test_disabled_auth_uses_default_member() {
        let app = app(Arc::new(AuthManager::for_test(false)));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], DEFAULT_MEMBER_ID.as_bytes());
    }

    #[tokio::test]
    async fn test_garbage_cookie_rejected() {
        let app = app(Arc::new(AuthManager::for_test(true)));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, format!("{}=garbage", SESSION_COOKIE_NAME))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
