//! Team API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{TeamMemberRow, WorkSessionRow};

/// Team member DTO. Never exposes the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamMemberDto {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub status: String,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeamMemberRow> for TeamMemberDto {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            status: row.status,
            last_active: if row.last_active > 0 {
                DateTime::from_timestamp(row.last_active, 0)
            } else {
                None
            },
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Work session DTO with computed duration
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkSessionDto {
    pub id: String,
    pub member_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds between start and end (or now, for the open session)
    pub duration_secs: i64,
}

impl From<WorkSessionRow> for WorkSessionDto {
    fn from(row: WorkSessionRow) -> Self {
        let end = row.ended_at.unwrap_or_else(|| Utc::now().timestamp());
        Self {
            id: row.id,
            member_id: row.member_id,
            started_at: DateTime::from_timestamp(row.started_at, 0).unwrap_or_else(Utc::now),
            ended_at: row.ended_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            duration_secs: (end - row.started_at).max(0),
        }
    }
}

/// Request body for creating a team member
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Role must be at most 100 characters"))]
    pub role: Option<String>,
    #[validate(length(min = 8, max = 200, message = "Password must be 8-200 characters"))]
    pub password: Option<String>,
}

/// Request body for updating a team member (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Role must be at most 100 characters"))]
    pub role: Option<String>,
    #[validate(length(min = 8, max = 200, message = "Password must be 8-200 characters"))]
    pub password: Option<String>,
}

/// Query params for listing team members
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListMembersQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}
