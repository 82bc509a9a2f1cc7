//! Team API endpoints (members, presence, work sessions)

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::team::{
    MemberPatch, NewMember, create_member, delete_member, get_member, heartbeat, list_members,
    list_work_sessions, sweep_stale_members, update_member,
};

use types::{
    CreateMemberRequest, ListMembersQuery, TeamMemberDto, UpdateMemberRequest, WorkSessionDto,
};

/// Shared state for Team API endpoints
#[derive(Clone)]
pub struct TeamApiState {
    pub pool: SqlitePool,
    /// Heartbeat silence after which a member is considered offline
    pub stale_secs: i64,
}

/// Build Team API routes
pub fn routes(pool: SqlitePool, stale_secs: i64) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/heartbeat", post(beat))
        .route("/{id}/sessions", get(sessions))
        .with_state(TeamApiState { pool, stale_secs })
}

fn member_not_found(id: &str) -> ApiError {
    ApiError::not_found("MEMBER_NOT_FOUND", format!("Member not found: {}", id))
}

/// List team members by name. Sweeps stale presence first so the returned
/// statuses are current.
#[utoipa::path(
    get,
    path = "/api/team",
    tag = "team",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of team members with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<TeamApiState>,
    ValidatedQuery(query): ValidatedQuery<ListMembersQuery>,
) -> Result<Json<PaginatedResponse<TeamMemberDto>>, ApiError> {
    sweep_stale_members(&state.pool, state.stale_secs)
        .await
        .map_err(ApiError::from_sqlite)?;

    let (rows, total) = list_members(&state.pool, query.page, query.limit)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<TeamMemberDto> = rows.into_iter().map(TeamMemberDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a team member
#[utoipa::path(
    post,
    path = "/api/team",
    tag = "team",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member created", body = TeamMemberDto),
        (status = 400, description = "Duplicate email or phone")
    )
)]
pub async fn create(
    State(state): State<TeamApiState>,
    Extension(session): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateMemberRequest>,
) -> Result<(StatusCode, Json<TeamMemberDto>), ApiError> {
    let member = create_member(
        &state.pool,
        &NewMember {
            name: body.name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            password: body.password,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "team",
        Some(&member.id),
        "created",
        Some(&member.name),
        Some(&session.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(TeamMemberDto::from(member))))
}

/// Get a single team member by ID
#[utoipa::path(
    get,
    path = "/api/team/{id}",
    tag = "team",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = TeamMemberDto),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_one(
    State(state): State<TeamApiState>,
    path: IdPath,
) -> Result<Json<TeamMemberDto>, ApiError> {
    let member = get_member(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| member_not_found(&path.id))?;
    Ok(Json(TeamMemberDto::from(member)))
}

/// Update a team member. A new password is re-hashed.
#[utoipa::path(
    put,
    path = "/api/team/{id}",
    tag = "team",
    params(("id" = String, Path, description = "Member ID")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = TeamMemberDto),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update(
    State(state): State<TeamApiState>,
    path: IdPath,
    Extension(session): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateMemberRequest>,
) -> Result<Json<TeamMemberDto>, ApiError> {
    let member = update_member(
        &state.pool,
        &path.id,
        &MemberPatch {
            name: body.name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            password: body.password,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| member_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "team",
        Some(&member.id),
        "updated",
        None,
        Some(&session.0),
    )
    .await;

    Ok(Json(TeamMemberDto::from(member)))
}

/// Delete a team member, cascading their work sessions
#[utoipa::path(
    delete,
    path = "/api/team/{id}",
    tag = "team",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn delete(
    State(state): State<TeamApiState>,
    path: IdPath,
    Extension(session): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_member(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(member_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "team",
        Some(&path.id),
        "deleted",
        None,
        Some(&session.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Record a presence heartbeat, marking the member active
#[utoipa::path(
    post,
    path = "/api/team/{id}/heartbeat",
    tag = "team",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Heartbeat recorded", body = TeamMemberDto),
        (status = 404, description = "Member not found")
    )
)]
pub async fn beat(
    State(state): State<TeamApiState>,
    path: IdPath,
) -> Result<Json<TeamMemberDto>, ApiError> {
    let member = heartbeat(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| member_not_found(&path.id))?;
    Ok(Json(TeamMemberDto::from(member)))
}

/// List a member's work sessions, newest first
#[utoipa::path(
    get,
    path = "/api/team/{id}/sessions",
    tag = "team",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Work sessions"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn sessions(
    State(state): State<TeamApiState>,
    path: IdPath,
) -> Result<Json<Vec<WorkSessionDto>>, ApiError> {
    get_member(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| member_not_found(&path.id))?;

    let rows = list_work_sessions(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(rows.into_iter().map(WorkSessionDto::from).collect()))
}
