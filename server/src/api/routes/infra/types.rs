//! Infrastructure asset API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::InfraAssetRow;

/// Infrastructure asset DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct InfraAssetDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub provider: Option<String>,
    pub status: String,
    /// Free-form JSON object, shape depends on the asset type
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InfraAssetRow> for InfraAssetDto {
    fn from(row: InfraAssetRow) -> Self {
        let metadata = serde_json::from_str(&row.metadata)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));
        Self {
            id: row.id,
            name: row.name,
            asset_type: row.asset_type,
            provider: row.provider,
            status: row.status,
            metadata,
            expires_at: row.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Metadata must be a JSON object, not an array or scalar
pub fn validate_metadata_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::new("metadata_object")
            .with_message("Metadata must be a JSON object".into()));
    }
    Ok(())
}

fn validate_asset_type(value: &str) -> Result<(), ValidationError> {
    match value {
        "domain" | "server" | "email" => Ok(()),
        _ => Err(ValidationError::new("asset_type")
            .with_message("Type must be one of: domain, server, email".into())),
    }
}

fn validate_asset_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "active" | "expiring" | "retired" => Ok(()),
        _ => Err(ValidationError::new("asset_status")
            .with_message("Status must be one of: active, expiring, retired".into())),
    }
}

/// Request body for creating an asset
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Asset type: domain, server, or email
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_asset_type"))]
    pub asset_type: String,
    #[validate(length(max = 200, message = "Provider must be at most 200 characters"))]
    pub provider: Option<String>,
    #[validate(custom(function = "validate_asset_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_metadata_object"))]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub expires_at: Option<i64>,
}

/// Request body for updating an asset (partial). Type is immutable.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Provider must be at most 200 characters"))]
    pub provider: Option<String>,
    #[validate(custom(function = "validate_asset_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_metadata_object"))]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub expires_at: Option<i64>,
}

/// Query params for listing assets
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListAssetsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Optional asset type filter
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_rejected() {
        let body: CreateAssetRequest =
            serde_json::from_value(serde_json::json!({"name": "ops.example", "type": "bogus"}))
                .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let body: UpdateAssetRequest =
            serde_json::from_value(serde_json::json!({"status": "decommissioned"})).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_known_values_accepted() {
        let body: CreateAssetRequest = serde_json::from_value(serde_json::json!({
            "name": "ops.example",
            "type": "domain",
            "status": "expiring"
        }))
        .unwrap();
        assert!(body.validate().is_ok());
    }
}
