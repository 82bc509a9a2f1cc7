//! Auth API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::routes::team::types::TeamMemberDto;

/// Request body for requesting a one-time code
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestOtpRequest {
    #[validate(length(min = 5, max = 32, message = "Phone must be 5-32 characters"))]
    pub phone: String,
}

/// Response for a one-time code request
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestOtpResponse {
    /// Seconds until the code expires
    pub expires_in: i64,
}

/// Request body for logging in, either by phone + code or email + password
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    pub phone: Option<String>,
    pub code: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for a successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub member: TeamMemberDto,
}

/// Response for the session status probe
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub authenticated: bool,
    pub auth_enabled: bool,
    pub member: Option<TeamMemberDto>,
}
