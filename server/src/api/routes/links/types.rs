//! Shared link API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::LinkRow;

/// Shared link DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LinkDto {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LinkRow> for LinkDto {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            url: row.url,
            category: row.category,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Request body for creating a link
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(url(message = "Invalid URL"))]
    pub url: String,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
}

/// Request body for updating a link (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
}

/// Query params for listing links
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListLinksQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}
