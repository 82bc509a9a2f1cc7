//! Project API endpoints
//!
//! Covers the project record, its checklist tasks, and infrastructure links.

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{IdPath, NestedPath, ValidatedJson, ValidatedQuery};
use crate::api::routes::infra::types::InfraAssetDto;
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::infra::{
    get_asset, link_asset, list_assets_for_project, unlink_asset,
};
use crate::data::sqlite::repositories::project::{
    NewProject, NewProjectTask, ProjectPatch, ProjectTaskPatch, create_project,
    create_project_task, delete_project, delete_project_task, get_project, list_project_tasks,
    list_projects, update_project, update_project_task,
};

use types::{
    CreateProjectRequest, CreateProjectTaskRequest, ListProjectsQuery, ProjectDto, ProjectTaskDto,
    UpdateProjectRequest, UpdateProjectTaskRequest,
};

/// Shared state for Project API endpoints
#[derive(Clone)]
pub struct ProjectsApiState {
    pub pool: SqlitePool,
}

/// Build Project API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/tasks", get(list_checklist).post(create_checklist))
        .route(
            "/{id}/tasks/{child_id}",
            put(update_checklist).delete(delete_checklist),
        )
        .route("/{id}/infra", get(list_infra))
        .route("/{id}/infra/{child_id}", put(link_infra).delete(unlink_infra))
        .with_state(ProjectsApiState { pool })
}

fn project_not_found(id: &str) -> ApiError {
    ApiError::not_found("PROJECT_NOT_FOUND", format!("Project not found: {}", id))
}

async fn require_project(state: &ProjectsApiState, id: &str) -> Result<(), ApiError> {
    get_project(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| project_not_found(id))?;
    Ok(())
}

/// List projects, newest first, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "List of projects with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<ProjectsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListProjectsQuery>,
) -> Result<Json<PaginatedResponse<ProjectDto>>, ApiError> {
    let (rows, total) = list_projects(
        &state.pool,
        query.page,
        query.limit,
        query.status.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<ProjectDto> = rows.into_iter().map(ProjectDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectDto)
    )
)]
pub async fn create(
    State(state): State<ProjectsApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDto>), ApiError> {
    let project = create_project(
        &state.pool,
        &NewProject {
            name: body.name,
            client: body.client,
            description: body.description,
            status: body.status,
            start_date: body.start_date,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "project",
        Some(&project.id),
        "created",
        Some(&project.name),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(ProjectDto::from(project))))
}

/// Get a single project by ID
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project details", body = ProjectDto),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_one(
    State(state): State<ProjectsApiState>,
    path: IdPath,
) -> Result<Json<ProjectDto>, ApiError> {
    let project = get_project(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| project_not_found(&path.id))?;
    Ok(Json(ProjectDto::from(project)))
}

/// Update a project's fields. Derived progress columns are not writable.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectDto),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update(
    State(state): State<ProjectsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateProjectRequest>,
) -> Result<Json<ProjectDto>, ApiError> {
    let project = update_project(
        &state.pool,
        &path.id,
        &ProjectPatch {
            name: body.name,
            client: body.client,
            description: body.description,
            status: body.status,
            start_date: body.start_date,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| project_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "project",
        Some(&project.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(ProjectDto::from(project)))
}

/// Delete a project, cascading its checklist and infra links
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete(
    State(state): State<ProjectsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_project(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(project_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "project",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Checklist tasks
// =============================================================================

/// List a project's checklist tasks, oldest first
#[utoipa::path(
    get,
    path = "/api/projects/{id}/tasks",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Checklist tasks"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_checklist(
    State(state): State<ProjectsApiState>,
    path: IdPath,
) -> Result<Json<Vec<ProjectTaskDto>>, ApiError> {
    require_project(&state, &path.id).await?;
    let rows = list_project_tasks(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(rows.into_iter().map(ProjectTaskDto::from).collect()))
}

/// Add a checklist task to a project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = CreateProjectTaskRequest,
    responses(
        (status = 201, description = "Checklist task created", body = ProjectTaskDto),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create_checklist(
    State(state): State<ProjectsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateProjectTaskRequest>,
) -> Result<(StatusCode, Json<ProjectTaskDto>), ApiError> {
    require_project(&state, &path.id).await?;

    let task = create_project_task(
        &state.pool,
        &path.id,
        &NewProjectTask {
            title: body.title,
            status: body.status,
            assignee: body.assignee,
            due_date: body.due_date,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "project",
        Some(&path.id),
        "task_added",
        Some(&task.title),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(ProjectTaskDto::from(task))))
}

/// Update a checklist task
#[utoipa::path(
    put,
    path = "/api/projects/{id}/tasks/{child_id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("child_id" = String, Path, description = "Checklist task ID")
    ),
    request_body = UpdateProjectTaskRequest,
    responses(
        (status = 200, description = "Checklist task updated", body = ProjectTaskDto),
        (status = 404, description = "Project or task not found")
    )
)]
pub async fn update_checklist(
    State(state): State<ProjectsApiState>,
    path: NestedPath,
    ValidatedJson(body): ValidatedJson<UpdateProjectTaskRequest>,
) -> Result<Json<ProjectTaskDto>, ApiError> {
    let task = update_project_task(
        &state.pool,
        &path.id,
        &path.child_id,
        &ProjectTaskPatch {
            title: body.title,
            status: body.status,
            assignee: body.assignee,
            due_date: body.due_date,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| {
        ApiError::not_found(
            "TASK_NOT_FOUND",
            format!("Checklist task not found: {}", path.child_id),
        )
    })?;

    Ok(Json(ProjectTaskDto::from(task)))
}

/// Delete a checklist task
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/tasks/{child_id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("child_id" = String, Path, description = "Checklist task ID")
    ),
    responses(
        (status = 204, description = "Checklist task deleted"),
        (status = 404, description = "Project or task not found")
    )
)]
pub async fn delete_checklist(
    State(state): State<ProjectsApiState>,
    path: NestedPath,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_project_task(&state.pool, &path.id, &path.child_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(ApiError::not_found(
            "TASK_NOT_FOUND",
            format!("Checklist task not found: {}", path.child_id),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Infrastructure links
// =============================================================================

/// List the infrastructure assets linked to a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/infra",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Linked assets"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_infra(
    State(state): State<ProjectsApiState>,
    path: IdPath,
) -> Result<Json<Vec<InfraAssetDto>>, ApiError> {
    require_project(&state, &path.id).await?;
    let rows = list_assets_for_project(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(rows.into_iter().map(InfraAssetDto::from).collect()))
}

/// Link an infrastructure asset to a project (idempotent)
#[utoipa::path(
    put,
    path = "/api/projects/{id}/infra/{child_id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("child_id" = String, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset linked (or already linked)"),
        (status = 404, description = "Project or asset not found")
    )
)]
pub async fn link_infra(
    State(state): State<ProjectsApiState>,
    path: NestedPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    require_project(&state, &path.id).await?;
    get_asset(&state.pool, &path.child_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found(
                "ASSET_NOT_FOUND",
                format!("Asset not found: {}", path.child_id),
            )
        })?;

    let linked = link_asset(&state.pool, &path.id, &path.child_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    if linked {
        record_activity_best_effort(
            &state.pool,
            "project",
            Some(&path.id),
            "infra_linked",
            Some(&path.child_id),
            Some(&member.0),
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Unlink an infrastructure asset from a project
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/infra/{child_id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("child_id" = String, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset unlinked"),
        (status = 404, description = "Link not found")
    )
)]
pub async fn unlink_infra(
    State(state): State<ProjectsApiState>,
    path: NestedPath,
) -> Result<StatusCode, ApiError> {
    let unlinked = unlink_asset(&state.pool, &path.id, &path.child_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !unlinked {
        return Err(ApiError::not_found(
            "LINK_NOT_FOUND",
            format!(
                "Asset {} is not linked to project {}",
                path.child_id, path.id
            ),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
