//! Employee API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::EmployeeRow;

/// Employee DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeDto {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub onboarding_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for EmployeeDto {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            department: row.department,
            start_date: row.start_date.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            onboarding_status: row.onboarding_status,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Onboarding status must match the schema's allowed values
fn validate_onboarding_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "invited" | "docs_pending" | "active" => Ok(()),
        _ => Err(ValidationError::new("onboarding_status")
            .with_message("Onboarding status must be one of: invited, docs_pending, active".into())),
    }
}

/// Request body for creating an employee
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Role must be at most 100 characters"))]
    pub role: Option<String>,
    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,
    pub start_date: Option<i64>,
    #[validate(custom(function = "validate_onboarding_status"))]
    pub onboarding_status: Option<String>,
}

/// Request body for updating an employee (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Role must be at most 100 characters"))]
    pub role: Option<String>,
    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,
    pub start_date: Option<i64>,
    #[validate(custom(function = "validate_onboarding_status"))]
    pub onboarding_status: Option<String>,
}

/// Query params for listing employees
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListEmployeesQuery {
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
    fn test_unknown_onboarding_status_rejected() {
        let body: CreateEmployeeRequest =
            serde_json::from_value(serde_json::json!({"name": "Sam", "onboarding_status": "bogus"}))
                .unwrap();
        assert!(body.validate().is_err());

        let body: UpdateEmployeeRequest =
            serde_json::from_value(serde_json::json!({"onboarding_status": "hired"})).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_known_onboarding_status_accepted() {
        let body: CreateEmployeeRequest = serde_json::from_value(
            serde_json::json!({"name": "Sam", "onboarding_status": "docs_pending"}),
        )
        .unwrap();
        assert!(body.validate().is_ok());
    }
}
