//! Proposal API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{ProposalRow, ProposalStatus};

/// Proposal DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ProposalDto {
    pub id: String,
    pub lead_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub value: Option<f64>,
    pub scope: Option<String>,
    pub exclusions: Option<String>,
    pub terms: Option<String>,
    pub assumptions: Option<String>,
    pub status: String,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProposalRow> for ProposalDto {
    fn from(row: ProposalRow) -> Self {
        Self {
            id: row.id,
            lead_id: row.lead_id,
            project_id: row.project_id,
            title: row.title,
            value: row.value,
            scope: row.scope,
            exclusions: row.exclusions,
            terms: row.terms,
            assumptions: row.assumptions,
            status: row.status,
            valid_until: row
                .valid_until
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Request body for creating a proposal
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProposalRequest {
    pub lead_id: Option<String>,
    pub project_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(range(min = 0.0, message = "Value must be non-negative"))]
    pub value: Option<f64>,
    pub scope: Option<String>,
    pub exclusions: Option<String>,
    pub terms: Option<String>,
    pub assumptions: Option<String>,
    pub valid_until: Option<i64>,
}

/// Request body for updating a proposal.
///
/// Status is deliberately absent; transitions go through the status endpoint.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProposalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0.0, message = "Value must be non-negative"))]
    pub value: Option<f64>,
    pub scope: Option<String>,
    pub exclusions: Option<String>,
    pub terms: Option<String>,
    pub assumptions: Option<String>,
    pub valid_until: Option<i64>,
}

/// Request body for transitioning a proposal's status
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetProposalStatusRequest {
    pub status: ProposalStatus,
}

/// Query params for listing proposals
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListProposalsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Optional lifecycle status filter
    pub status: Option<String>,
}
