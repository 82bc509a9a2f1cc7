//! Lead API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::lead::{
    ConvertTarget, LeadPatch, NewLead, convert_lead, create_lead, delete_lead, get_lead,
    list_leads, update_lead,
};
use crate::data::types::LeadStatus;

use types::{
    ConvertLeadRequest, ConvertTo, CreateLeadRequest, LeadDto, ListLeadsQuery, UpdateLeadRequest,
};

/// Shared state for Lead API endpoints
#[derive(Clone)]
pub struct LeadsApiState {
    pub pool: SqlitePool,
}

/// Build Lead API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/convert", post(convert))
        .with_state(LeadsApiState { pool })
}

/// List leads, newest first, optionally filtered by pipeline status
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by pipeline status")
    ),
    responses(
        (status = 200, description = "List of leads with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<LeadsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListLeadsQuery>,
) -> Result<Json<PaginatedResponse<LeadDto>>, ApiError> {
    let status = match &query.status {
        Some(s) => Some(LeadStatus::parse(s).ok_or_else(|| {
            ApiError::bad_request("INVALID_STATUS", format!("Unknown lead status: {}", s))
        })?),
        None => None,
    };

    let (rows, total) = list_leads(&state.pool, query.page, query.limit, status)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<LeadDto> = rows.into_iter().map(LeadDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a new lead
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadDto),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create(
    State(state): State<LeadsApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadDto>), ApiError> {
    let lead = create_lead(
        &state.pool,
        &NewLead {
            name: body.name,
            email: body.email,
            phone: body.phone,
            company: body.company,
            source: body.source,
            notes: body.notes,
            status: body.status,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "lead",
        Some(&lead.id),
        "created",
        Some(&lead.name),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(LeadDto::from(lead))))
}

/// Get a single lead by ID
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead details", body = LeadDto),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn get_one(
    State(state): State<LeadsApiState>,
    path: IdPath,
) -> Result<Json<LeadDto>, ApiError> {
    let lead = get_lead(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("LEAD_NOT_FOUND", format!("Lead not found: {}", path.id))
        })?;
    Ok(Json(LeadDto::from(lead)))
}

/// Update a lead's fields.
///
/// A terminal status transition syncs the linked proposal.
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = LeadDto),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn update(
    State(state): State<LeadsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateLeadRequest>,
) -> Result<Json<LeadDto>, ApiError> {
    let lead = update_lead(
        &state.pool,
        &path.id,
        &LeadPatch {
            name: body.name,
            email: body.email,
            phone: body.phone,
            company: body.company,
            source: body.source,
            notes: body.notes,
            status: body.status,
            loss_reason: body.loss_reason,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| {
        ApiError::not_found("LEAD_NOT_FOUND", format!("Lead not found: {}", path.id))
    })?;

    record_activity_best_effort(
        &state.pool,
        "lead",
        Some(&lead.id),
        "updated",
        body.status.map(|s| s.as_str()),
        Some(&member.0),
    )
    .await;

    Ok(Json(LeadDto::from(lead)))
}

/// Delete a lead
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn delete(
    State(state): State<LeadsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_lead(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(ApiError::not_found(
            "LEAD_NOT_FOUND",
            format!("Lead not found: {}", path.id),
        ));
    }

    record_activity_best_effort(
        &state.pool,
        "lead",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Convert a lead into a draft proposal or a project
#[utoipa::path(
    post,
    path = "/api/leads/{id}/convert",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    request_body = ConvertLeadRequest,
    responses(
        (status = 200, description = "Lead converted", body = LeadDto),
        (status = 404, description = "Lead not found"),
        (status = 409, description = "Lead already converted")
    )
)]
pub async fn convert(
    State(state): State<LeadsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<ConvertLeadRequest>,
) -> Result<Json<LeadDto>, ApiError> {
    let target = match body.to {
        ConvertTo::Proposal => ConvertTarget::Proposal,
        ConvertTo::Project => ConvertTarget::Project,
    };

    let lead = convert_lead(&state.pool, &path.id, target)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("LEAD_NOT_FOUND", format!("Lead not found: {}", path.id))
        })?;

    let detail = match body.to {
        ConvertTo::Proposal => "to_proposal",
        ConvertTo::Project => "to_project",
    };
    record_activity_best_effort(
        &state.pool,
        "lead",
        Some(&lead.id),
        "converted",
        Some(detail),
        Some(&member.0),
    )
    .await;

    Ok(Json(LeadDto::from(lead)))
}
