//! Project API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{ProjectRow, ProjectTaskRow};

/// Project DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    pub client: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    /// Derived completion percentage (100 when no tasks)
    pub progress: i64,
    /// Derived total task count
    pub tasks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for ProjectDto {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            client: row.client,
            description: row.description,
            status: row.status,
            start_date: row.start_date.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            progress: row.progress,
            tasks: row.tasks,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Checklist task DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectTaskDto {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: String,
    pub assignee: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectTaskRow> for ProjectTaskDto {
    fn from(row: ProjectTaskRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            status: row.status,
            assignee: row.assignee,
            due_date: row.due_date.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Project lifecycle status must match the schema's allowed values
fn validate_project_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "active" | "on_hold" | "completed" | "archived" => Ok(()),
        _ => Err(ValidationError::new("project_status")
            .with_message("Status must be one of: active, on_hold, completed, archived".into())),
    }
}

fn validate_checklist_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "pending" | "done" => Ok(()),
        _ => Err(ValidationError::new("checklist_status")
            .with_message("Status must be one of: pending, done".into())),
    }
}

/// Request body for creating a project
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 200, message = "Client must be at most 200 characters"))]
    pub client: Option<String>,
    #[validate(length(max = 10_000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,
    pub start_date: Option<i64>,
}

/// Request body for updating a project (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Client must be at most 200 characters"))]
    pub client: Option<String>,
    #[validate(length(max = 10_000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,
    pub start_date: Option<i64>,
}

/// Request body for creating a checklist task
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectTaskRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_checklist_status"))]
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

/// Request body for updating a checklist task (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectTaskRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_checklist_status"))]
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

/// Query params for listing projects
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListProjectsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Optional status filter
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_project_status_rejected() {
        let body: CreateProjectRequest =
            serde_json::from_value(serde_json::json!({"name": "Relaunch", "status": "bogus"}))
                .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_unknown_checklist_status_rejected() {
        let body: UpdateProjectTaskRequest =
            serde_json::from_value(serde_json::json!({"status": "in_progress"})).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_known_statuses_accepted() {
        let body: UpdateProjectRequest =
            serde_json::from_value(serde_json::json!({"status": "on_hold"})).unwrap();
        assert!(body.validate().is_ok());

        let body: CreateProjectTaskRequest =
            serde_json::from_value(serde_json::json!({"title": "Kickoff", "status": "pending"}))
                .unwrap();
        assert!(body.validate().is_ok());
    }
}
