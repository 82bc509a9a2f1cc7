//! Activity log API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::{list_activity, record_activity};

use types::{ActivityDto, CreateActivityRequest, ListActivityQuery};

/// Shared state for Activity API endpoints
#[derive(Clone)]
pub struct ActivityApiState {
    pub pool: SqlitePool,
}

/// Build Activity API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .with_state(ActivityApiState { pool })
}

/// List activity entries, newest first, filtered by entity
#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "activity",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("entity_type" = Option<String>, Query, description = "Filter by entity type"),
        ("entity_id" = Option<String>, Query, description = "Filter by entity ID")
    ),
    responses(
        (status = 200, description = "Activity entries with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<ActivityApiState>,
    ValidatedQuery(query): ValidatedQuery<ListActivityQuery>,
) -> Result<Json<PaginatedResponse<ActivityDto>>, ApiError> {
    let (rows, total) = list_activity(
        &state.pool,
        query.page,
        query.limit,
        query.entity_type.as_deref(),
        query.entity_id.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<ActivityDto> = rows.into_iter().map(ActivityDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Record a manual activity entry attributed to the current member
#[utoipa::path(
    post,
    path = "/api/activity",
    tag = "activity",
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Entry recorded", body = ActivityDto)
    )
)]
pub async fn create(
    State(state): State<ActivityApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityDto>), ApiError> {
    let entry = record_activity(
        &state.pool,
        &body.entity_type,
        body.entity_id.as_deref(),
        &body.action,
        body.detail.as_deref(),
        Some(&member.0),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    Ok((StatusCode::CREATED, Json(ActivityDto::from(entry))))
}
