//! Lead API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{LeadRow, LeadStatus};

/// Lead DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadDto {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub loss_reason: Option<String>,
    pub proposal_id: Option<String>,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadRow> for LeadDto {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            source: row.source,
            notes: row.notes,
            status: row.status,
            loss_reason: row.loss_reason,
            proposal_id: row.proposal_id,
            project_id: row.project_id,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Request body for creating a lead
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Company must be at most 200 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "Source must be at most 100 characters"))]
    pub source: Option<String>,
    #[validate(length(max = 10_000, message = "Notes must be at most 10000 characters"))]
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
}

/// Request body for updating a lead (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLeadRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Company must be at most 200 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "Source must be at most 100 characters"))]
    pub source: Option<String>,
    #[validate(length(max = 10_000, message = "Notes must be at most 10000 characters"))]
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
    #[validate(length(max = 500, message = "Loss reason must be at most 500 characters"))]
    pub loss_reason: Option<String>,
}

/// Conversion target for `POST /api/leads/{id}/convert`
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConvertTo {
    Proposal,
    Project,
}

/// Request body for converting a lead
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConvertLeadRequest {
    pub to: ConvertTo,
}

/// Query params for listing leads
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListLeadsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Optional pipeline status filter
    pub status: Option<String>,
}
