//! Activity log API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::ActivityRow;

/// Activity entry DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityDto {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub action: String,
    pub detail: Option<String>,
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityDto {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            action: row.action,
            detail: row.detail,
            actor: row.actor,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Request body for recording a manual activity entry
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 50, message = "Entity type must be 1-50 characters"))]
    pub entity_type: String,
    #[validate(length(max = 64, message = "Entity ID must be at most 64 characters"))]
    pub entity_id: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Action must be 1-100 characters"))]
    pub action: String,
    #[validate(length(max = 500, message = "Detail must be at most 500 characters"))]
    pub detail: Option<String>,
}

/// Query params for listing activity
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListActivityQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Optional entity type filter
    pub entity_type: Option<String>,
    /// Optional entity ID filter
    pub entity_id: Option<String>,
}
