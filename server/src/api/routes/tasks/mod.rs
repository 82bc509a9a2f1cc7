//! Task API endpoints (board tasks, subtasks, comments)

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete as delete_route, get, put};
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{IdPath, NestedPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::task::{
    NewTask, TaskFilter, TaskPatch, create_comment, create_subtask, create_task, delete_comment,
    delete_subtask, delete_task, get_task, list_comments, list_subtasks, list_tasks,
    update_subtask, update_task,
};

use types::{
    CreateCommentRequest, CreateSubtaskRequest, CreateTaskRequest, ListTasksQuery, SubtaskDto,
    TaskCommentDto, TaskDto, UpdateSubtaskRequest, UpdateTaskRequest,
};

/// Shared state for Task API endpoints
#[derive(Clone)]
pub struct TasksApiState {
    pub pool: SqlitePool,
}

/// Build Task API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/subtasks", get(list_subs).post(create_sub))
        .route(
            "/{id}/subtasks/{child_id}",
            put(update_sub).delete(delete_sub),
        )
        .route("/{id}/comments", get(list_task_comments).post(post_comment))
        .route("/{id}/comments/{child_id}", delete_route(remove_comment))
        .with_state(TasksApiState { pool })
}

fn task_not_found(id: &str) -> ApiError {
    ApiError::not_found("TASK_NOT_FOUND", format!("Task not found: {}", id))
}

async fn require_task(state: &TasksApiState, id: &str) -> Result<(), ApiError> {
    get_task(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| task_not_found(id))?;
    Ok(())
}

/// List tasks, newest first, filtered by status and/or project
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by board status"),
        ("project_id" = Option<String>, Query, description = "Filter by project attachment")
    ),
    responses(
        (status = 200, description = "List of tasks with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<TasksApiState>,
    ValidatedQuery(query): ValidatedQuery<ListTasksQuery>,
) -> Result<Json<PaginatedResponse<TaskDto>>, ApiError> {
    let (rows, total) = list_tasks(
        &state.pool,
        query.page,
        query.limit,
        &TaskFilter {
            status: query.status.clone(),
            project_id: query.project_id.clone(),
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<TaskDto> = rows.into_iter().map(TaskDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a task, optionally attached to a project
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskDto)
    )
)]
pub async fn create(
    State(state): State<TasksApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskDto>), ApiError> {
    let task = create_task(
        &state.pool,
        &NewTask {
            project_id: body.project_id,
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            assignee: body.assignee,
            due_date: body.due_date,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "task",
        Some(&task.id),
        "created",
        Some(&task.title),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(TaskDto::from(task))))
}

/// Get a single task by ID
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task details", body = TaskDto),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_one(
    State(state): State<TasksApiState>,
    path: IdPath,
) -> Result<Json<TaskDto>, ApiError> {
    let task = get_task(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| task_not_found(&path.id))?;
    Ok(Json(TaskDto::from(task)))
}

/// Update a task. Setting `project_id` to null detaches it; moves and
/// completion changes recompute the affected projects' progress.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskDto),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update(
    State(state): State<TasksApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<TaskDto>, ApiError> {
    let task = update_task(
        &state.pool,
        &path.id,
        &TaskPatch {
            project_id: body.project_id,
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            assignee: body.assignee,
            due_date: body.due_date,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| task_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "task",
        Some(&task.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(TaskDto::from(task)))
}

/// Delete a task, cascading its subtasks and comments
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete(
    State(state): State<TasksApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_task(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(task_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "task",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Subtasks
// =============================================================================

/// List a task's subtasks, oldest first
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/subtasks",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Subtasks"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn list_subs(
    State(state): State<TasksApiState>,
    path: IdPath,
) -> Result<Json<Vec<SubtaskDto>>, ApiError> {
    require_task(&state, &path.id).await?;
    let rows = list_subtasks(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(rows.into_iter().map(SubtaskDto::from).collect()))
}

/// Add a subtask
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/subtasks",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = CreateSubtaskRequest,
    responses(
        (status = 201, description = "Subtask created", body = SubtaskDto),
        (status = 404, description = "Task not found")
    )
)]
pub async fn create_sub(
    State(state): State<TasksApiState>,
    path: IdPath,
    ValidatedJson(body): ValidatedJson<CreateSubtaskRequest>,
) -> Result<(StatusCode, Json<SubtaskDto>), ApiError> {
    require_task(&state, &path.id).await?;
    let subtask = create_subtask(&state.pool, &path.id, &body.title)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok((StatusCode::CREATED, Json(SubtaskDto::from(subtask))))
}

/// Update a subtask's title or done flag
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/subtasks/{child_id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID"),
        ("child_id" = String, Path, description = "Subtask ID")
    ),
    request_body = UpdateSubtaskRequest,
    responses(
        (status = 200, description = "Subtask updated", body = SubtaskDto),
        (status = 404, description = "Subtask not found")
    )
)]
pub async fn update_sub(
    State(state): State<TasksApiState>,
    path: NestedPath,
    ValidatedJson(body): ValidatedJson<UpdateSubtaskRequest>,
) -> Result<Json<SubtaskDto>, ApiError> {
    let subtask = update_subtask(
        &state.pool,
        &path.id,
        &path.child_id,
        body.title.as_deref(),
        body.done,
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| {
        ApiError::not_found(
            "SUBTASK_NOT_FOUND",
            format!("Subtask not found: {}", path.child_id),
        )
    })?;
    Ok(Json(SubtaskDto::from(subtask)))
}

/// Delete a subtask
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}/subtasks/{child_id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID"),
        ("child_id" = String, Path, description = "Subtask ID")
    ),
    responses(
        (status = 204, description = "Subtask deleted"),
        (status = 404, description = "Subtask not found")
    )
)]
pub async fn delete_sub(
    State(state): State<TasksApiState>,
    path: NestedPath,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_subtask(&state.pool, &path.id, &path.child_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(ApiError::not_found(
            "SUBTASK_NOT_FOUND",
            format!("Subtask not found: {}", path.child_id),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Comments
// =============================================================================

/// List a task's comments, oldest first
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/comments",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn list_task_comments(
    State(state): State<TasksApiState>,
    path: IdPath,
) -> Result<Json<Vec<TaskCommentDto>>, ApiError> {
    require_task(&state, &path.id).await?;
    let rows = list_comments(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(rows.into_iter().map(TaskCommentDto::from).collect()))
}

/// Post a comment as the current member
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = TaskCommentDto),
        (status = 404, description = "Task not found")
    )
)]
pub async fn post_comment(
    State(state): State<TasksApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<TaskCommentDto>), ApiError> {
    require_task(&state, &path.id).await?;
    let comment = create_comment(&state.pool, &path.id, &member.0, &body.body)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok((StatusCode::CREATED, Json(TaskCommentDto::from(comment))))
}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}/comments/{child_id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID"),
        ("child_id" = String, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn remove_comment(
    State(state): State<TasksApiState>,
    path: NestedPath,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_comment(&state.pool, &path.id, &path.child_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(ApiError::not_found(
            "COMMENT_NOT_FOUND",
            format!("Comment not found: {}", path.child_id),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
