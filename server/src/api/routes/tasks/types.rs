//! Task API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{SubtaskRow, TaskCommentRow, TaskRow};

/// Task DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskDto {
    pub id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for TaskDto {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            assignee: row.assignee,
            due_date: row.due_date.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Subtask DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct SubtaskDto {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubtaskRow> for SubtaskDto {
    fn from(row: SubtaskRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            title: row.title,
            done: row.done,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Comment DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskCommentDto {
    pub id: String,
    pub task_id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<TaskCommentRow> for TaskCommentDto {
    fn from(row: TaskCommentRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            author: row.author,
            body: row.body,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Board status must match the schema's allowed values
fn validate_task_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "todo" | "in_progress" | "done" => Ok(()),
        _ => Err(ValidationError::new("task_status")
            .with_message("Status must be one of: todo, in_progress, done".into())),
    }
}

fn validate_task_priority(value: &str) -> Result<(), ValidationError> {
    match value {
        "low" | "medium" | "high" => Ok(()),
        _ => Err(ValidationError::new("task_priority")
            .with_message("Priority must be one of: low, medium, high".into())),
    }
}

/// Request body for creating a task
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    pub project_id: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,
    #[validate(length(max = 10_000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_task_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_task_priority"))]
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

/// Distinguishes an absent field from an explicit null
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Request body for updating a task (partial).
///
/// `project_id: null` detaches the task; omitting it leaves it unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub project_id: Option<Option<String>>,
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 10_000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_task_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_task_priority"))]
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

/// Request body for creating a subtask
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubtaskRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,
}

/// Request body for updating a subtask (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSubtaskRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,
    pub done: Option<bool>,
}

/// Request body for posting a comment
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10_000, message = "Body must be 1-10000 characters"))]
    pub body: String,
}

/// Query params for listing tasks
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListTasksQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Optional board status filter
    pub status: Option<String>,
    /// Optional project attachment filter
    pub project_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_rejected() {
        let body: CreateTaskRequest =
            serde_json::from_value(serde_json::json!({"title": "Ship it", "status": "bogus"}))
                .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_unknown_priority_rejected_on_update() {
        let body: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({"priority": "urgent"})).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_known_values_accepted() {
        let body: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "Ship it",
            "status": "in_progress",
            "priority": "high"
        }))
        .unwrap();
        assert!(body.validate().is_ok());
    }
}
