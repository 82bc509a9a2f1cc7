//! Agreement API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::AgreementRow;

/// Agreement DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct AgreementDto {
    pub id: String,
    pub title: String,
    pub party: Option<String>,
    pub kind: Option<String>,
    pub status: String,
    pub body: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AgreementRow> for AgreementDto {
    fn from(row: AgreementRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            party: row.party,
            kind: row.kind,
            status: row.status,
            body: row.body,
            signed_at: row.signed_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            expires_at: row.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Agreement lifecycle status must match the schema's allowed values
fn validate_agreement_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "draft" | "sent" | "signed" | "expired" => Ok(()),
        _ => Err(ValidationError::new("agreement_status")
            .with_message("Status must be one of: draft, sent, signed, expired".into())),
    }
}

/// Request body for creating an agreement
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAgreementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 200, message = "Party must be at most 200 characters"))]
    pub party: Option<String>,
    #[validate(length(max = 100, message = "Kind must be at most 100 characters"))]
    pub kind: Option<String>,
    #[validate(custom(function = "validate_agreement_status"))]
    pub status: Option<String>,
    pub body: Option<String>,
    pub signed_at: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Request body for updating an agreement (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAgreementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "Party must be at most 200 characters"))]
    pub party: Option<String>,
    #[validate(length(max = 100, message = "Kind must be at most 100 characters"))]
    pub kind: Option<String>,
    #[validate(custom(function = "validate_agreement_status"))]
    pub status: Option<String>,
    pub body: Option<String>,
    pub signed_at: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Query params for listing agreements
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListAgreementsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_rejected() {
        let body: CreateAgreementRequest =
            serde_json::from_value(serde_json::json!({"title": "NDA", "status": "bogus"}))
                .unwrap();
        assert!(body.validate().is_err());

        let body: UpdateAgreementRequest =
            serde_json::from_value(serde_json::json!({"status": "cancelled"})).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_known_status_accepted() {
        let body: CreateAgreementRequest =
            serde_json::from_value(serde_json::json!({"title": "NDA", "status": "signed"}))
                .unwrap();
        assert!(body.validate().is_ok());
    }
}
