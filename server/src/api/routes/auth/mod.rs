//! Auth API endpoints
//!
//! Mounted outside the session guard. Two login paths: phone + one-time
//! code, or email + password. Either one issues the session cookie and
//! opens a work session for the member.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sqlx::SqlitePool;

use crate::api::auth::AuthManager;
use crate::api::extractors::ValidatedJson;
use crate::api::routes::team::types::TeamMemberDto;
use crate::api::types::ApiError;
use crate::core::constants::{
    DEFAULT_MEMBER_ID, OTP_CODE_DIGITS, OTP_TTL_SECS, SESSION_COOKIE_NAME,
};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::otp::{issue_otp, purge_expired_otps, verify_and_consume_otp};
use crate::data::sqlite::repositories::team::{
    end_work_session, find_member_by_email, find_member_by_phone, get_member, set_presence,
    start_work_session,
};
use crate::data::types::TeamMemberRow;
use crate::utils::crypto::{constant_time_eq, generate_numeric_code, sha256_hex};

use types::{LoginRequest, LoginResponse, RequestOtpRequest, RequestOtpResponse, StatusResponse};

/// Shared state for Auth API endpoints
#[derive(Clone)]
pub struct AuthApiState {
    pub pool: SqlitePool,
    pub auth: Arc<AuthManager>,
}

/// Build Auth API routes
pub fn routes(pool: SqlitePool, auth: Arc<AuthManager>) -> Router<()> {
    Router::new()
        .route("/otp", post(request_otp))
        .route("/login", post(login))
        .route("/status", get(status))
        .route("/logout", post(logout))
        .with_state(AuthApiState { pool, auth })
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid credentials")
}

fn session_cookie(token: String, ttl_days: u32) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::days(ttl_days as i64));
    cookie
}

fn expired_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    cookie.set_path("/");
    cookie
}

/// Issue a one-time login code for a member's phone
///
/// Delivery is out of band; the code is written to the server log for the
/// operator to relay.
#[utoipa::path(
    post,
    path = "/api/auth/otp",
    tag = "auth",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "Code issued", body = RequestOtpResponse),
        (status = 404, description = "No member with that phone")
    )
)]
pub async fn request_otp(
    State(state): State<AuthApiState>,
    ValidatedJson(body): ValidatedJson<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    let member = find_member_by_phone(&state.pool, &body.phone)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("MEMBER_NOT_FOUND", "No member with that phone number")
        })?;

    purge_expired_otps(&state.pool)
        .await
        .map_err(ApiError::from_sqlite)?;

    let code = generate_numeric_code(OTP_CODE_DIGITS);
    issue_otp(&state.pool, &body.phone, &code, OTP_TTL_SECS)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::info!(member = %member.id, code, "One-time login code issued");

    Ok(Json(RequestOtpResponse {
        expires_in: OTP_TTL_SECS,
    }))
}

/// Log in with phone + code or email + password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 400, description = "Neither credential pair supplied"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (member, method) = match (&body.phone, &body.code, &body.email, &body.password) {
        (Some(phone), Some(code), _, _) => {
            let ok = verify_and_consume_otp(&state.pool, phone, code)
                .await
                .map_err(ApiError::from_sqlite)?;
            if !ok {
                return Err(invalid_credentials());
            }
            let member = find_member_by_phone(&state.pool, phone)
                .await
                .map_err(ApiError::from_sqlite)?
                .ok_or_else(invalid_credentials)?;
            (member, "otp")
        }
        (_, _, Some(email), Some(password)) => {
            let member = find_member_by_email(&state.pool, email)
                .await
                .map_err(ApiError::from_sqlite)?
                .ok_or_else(invalid_credentials)?;
            if !password_matches(&member, password) {
                return Err(invalid_credentials());
            }
            (member, "password")
        }
        _ => {
            return Err(ApiError::bad_request(
                "MISSING_CREDENTIALS",
                "Provide phone + code or email + password",
            ));
        }
    };

    set_presence(&state.pool, &member.id, true)
        .await
        .map_err(ApiError::from_sqlite)?;
    start_work_session(&state.pool, &member.id)
        .await
        .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "team_member",
        Some(&member.id),
        "logged_in",
        Some(method),
        Some(&member.id),
    )
    .await;

    let token = state
        .auth
        .create_session(&member.id, method)
        .map_err(|e| ApiError::internal(format!("Failed to issue session: {}", e)))?;
    let jar = jar.add(session_cookie(token, state.auth.session_ttl_days()));

    Ok((
        jar,
        Json(LoginResponse {
            member: TeamMemberDto::from(member),
        }),
    ))
}

fn password_matches(member: &TeamMemberRow, password: &str) -> bool {
    match &member.password_hash {
        Some(stored) => constant_time_eq(stored, &sha256_hex(password)),
        None => false,
    }
}

/// Report whether the caller holds a valid session
#[utoipa::path(
    get,
    path = "/api/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "Session status", body = StatusResponse)
    )
)]
pub async fn status(
    State(state): State<AuthApiState>,
    jar: CookieJar,
) -> Result<Json<StatusResponse>, ApiError> {
    let auth_enabled = state.auth.enabled();

    let member_id = if auth_enabled {
        jar.get(SESSION_COOKIE_NAME)
            .and_then(|cookie| state.auth.validate(cookie.value()).ok())
            .map(|claims| claims.member_id().to_string())
    } else {
        Some(DEFAULT_MEMBER_ID.to_string())
    };

    let member = match &member_id {
        Some(id) => get_member(&state.pool, id)
            .await
            .map_err(ApiError::from_sqlite)?
            .map(TeamMemberDto::from),
        None => None,
    };

    Ok(Json(StatusResponse {
        authenticated: member_id.is_some(),
        auth_enabled,
        member,
    }))
}

/// End the caller's session: close the work session, mark them offline and
/// expire the cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session ended")
    )
)]
pub async fn logout(
    State(state): State<AuthApiState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let member_id = if state.auth.enabled() {
        jar.get(SESSION_COOKIE_NAME)
            .and_then(|cookie| state.auth.validate(cookie.value()).ok())
            .map(|claims| claims.member_id().to_string())
    } else {
        Some(DEFAULT_MEMBER_ID.to_string())
    };

    if let Some(id) = member_id {
        end_work_session(&state.pool, &id)
            .await
            .map_err(ApiError::from_sqlite)?;
        set_presence(&state.pool, &id, false)
            .await
            .map_err(ApiError::from_sqlite)?;

        record_activity_best_effort(&state.pool, "team_member", Some(&id), "logged_out", None, Some(&id))
            .await;
    }

    let jar = jar.remove(expired_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::data::sqlite::repositories::team::{
        NewMember, create_member, get_member, list_work_sessions,
    };
    use crate::data::sqlite::repositories::test_support::test_pool;

    use super::*;

    async fn seeded_router() -> (Router<()>, String, SqlitePool) {
        let pool = test_pool().await;
        let member = create_member(
            &pool,
            &NewMember {
                name: "Sam".to_string(),
                email: Some("sam@acme.test".to_string()),
                phone: Some("+15550001".to_string()),
                password: Some("hunter2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let auth = Arc::new(AuthManager::for_test(true));
        (routes(pool.clone(), auth), member.id, pool)
    }

    fn json_post(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_password_login_sets_cookie_and_opens_session() {
        let (router, member_id, pool) = seeded_router().await;

        let response = router
            .oneshot(json_post(
                "/login",
                r#"{"email":"sam@acme.test","password":"hunter2"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with(SESSION_COOKIE_NAME));
        assert!(cookie.contains("HttpOnly"));

        let member = get_member(&pool, &member_id).await.unwrap().unwrap();
        assert_eq!(member.status, "active");

        let sessions = list_work_sessions(&pool, &member_id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].ended_at.is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (router, _, _) = seeded_router().await;

        let response = router
            .oneshot(json_post(
                "/login",
                r#"{"email":"sam@acme.test","password":"wrong"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_otp_login_consumes_code() {
        let (router, _, pool) = seeded_router().await;
        issue_otp(&pool, "+15550001", "123456", 300).await.unwrap();

        let response = router
            .clone()
            .oneshot(json_post(
                "/login",
                r#"{"phone":"+15550001","code":"123456"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Replaying the same code fails
        let replay = router
            .oneshot(json_post(
                "/login",
                r#"{"phone":"+15550001","code":"123456"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_bad_request() {
        let (router, _, _) = seeded_router().await;

        let response = router
            .oneshot(json_post("/login", r#"{"phone":"+15550001"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_otp_request_unknown_phone_404() {
        let (router, _, _) = seeded_router().await;

        let response = router
            .oneshot(json_post("/otp", r#"{"phone":"+19999999"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_without_cookie() {
        let (router, _, _) = seeded_router().await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["authenticated"], false);
        assert_eq!(value["auth_enabled"], true);
    }
}
