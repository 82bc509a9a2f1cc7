//! Proposal API endpoints

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
use crate::data::sqlite::repositories::proposal::{
    NewProposal, ProposalPatch, create_proposal, delete_proposal, get_proposal, list_proposals,
    set_proposal_status, update_proposal,
};
use crate::data::types::ProposalStatus;

use types::{
    CreateProposalRequest, ListProposalsQuery, ProposalDto, SetProposalStatusRequest,
    UpdateProposalRequest,
};

/// Shared state for Proposal API endpoints
#[derive(Clone)]
pub struct ProposalsApiState {
    pub pool: SqlitePool,
}

/// Build Proposal API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/status", post(set_status))
        .with_state(ProposalsApiState { pool })
}

/// List proposals, newest first, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/proposals",
    tag = "proposals",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by lifecycle status")
    ),
    responses(
        (status = 200, description = "List of proposals with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<ProposalsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListProposalsQuery>,
) -> Result<Json<PaginatedResponse<ProposalDto>>, ApiError> {
    let status = match &query.status {
        Some(s) => Some(ProposalStatus::parse(s).ok_or_else(|| {
            ApiError::bad_request("INVALID_STATUS", format!("Unknown proposal status: {}", s))
        })?),
        None => None,
    };

    let (rows, total) = list_proposals(&state.pool, query.page, query.limit, status)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<ProposalDto> = rows.into_iter().map(ProposalDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a draft proposal, linked to at most one of lead or project
#[utoipa::path(
    post,
    path = "/api/proposals",
    tag = "proposals",
    request_body = CreateProposalRequest,
    responses(
        (status = 201, description = "Proposal created", body = ProposalDto),
        (status = 409, description = "Linked to both a lead and a project")
    )
)]
pub async fn create(
    State(state): State<ProposalsApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateProposalRequest>,
) -> Result<(StatusCode, Json<ProposalDto>), ApiError> {
    let proposal = create_proposal(
        &state.pool,
        &NewProposal {
            lead_id: body.lead_id,
            project_id: body.project_id,
            title: body.title,
            value: body.value,
            scope: body.scope,
            exclusions: body.exclusions,
            terms: body.terms,
            assumptions: body.assumptions,
            valid_until: body.valid_until,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "proposal",
        Some(&proposal.id),
        "created",
        Some(&proposal.title),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(ProposalDto::from(proposal))))
}

/// Get a single proposal by ID
#[utoipa::path(
    get,
    path = "/api/proposals/{id}",
    tag = "proposals",
    params(("id" = String, Path, description = "Proposal ID")),
    responses(
        (status = 200, description = "Proposal details", body = ProposalDto),
        (status = 404, description = "Proposal not found")
    )
)]
pub async fn get_one(
    State(state): State<ProposalsApiState>,
    path: IdPath,
) -> Result<Json<ProposalDto>, ApiError> {
    let proposal = get_proposal(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found(
                "PROPOSAL_NOT_FOUND",
                format!("Proposal not found: {}", path.id),
            )
        })?;
    Ok(Json(ProposalDto::from(proposal)))
}

/// Update a proposal's content fields. Cannot change status.
#[utoipa::path(
    put,
    path = "/api/proposals/{id}",
    tag = "proposals",
    params(("id" = String, Path, description = "Proposal ID")),
    request_body = UpdateProposalRequest,
    responses(
        (status = 200, description = "Proposal updated", body = ProposalDto),
        (status = 404, description = "Proposal not found")
    )
)]
pub async fn update(
    State(state): State<ProposalsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateProposalRequest>,
) -> Result<Json<ProposalDto>, ApiError> {
    let proposal = update_proposal(
        &state.pool,
        &path.id,
        &ProposalPatch {
            title: body.title,
            value: body.value,
            scope: body.scope,
            exclusions: body.exclusions,
            terms: body.terms,
            assumptions: body.assumptions,
            valid_until: body.valid_until,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| {
        ApiError::not_found(
            "PROPOSAL_NOT_FOUND",
            format!("Proposal not found: {}", path.id),
        )
    })?;

    record_activity_best_effort(
        &state.pool,
        "proposal",
        Some(&proposal.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(ProposalDto::from(proposal)))
}

/// Delete a proposal
#[utoipa::path(
    delete,
    path = "/api/proposals/{id}",
    tag = "proposals",
    params(("id" = String, Path, description = "Proposal ID")),
    responses(
        (status = 204, description = "Proposal deleted"),
        (status = 404, description = "Proposal not found")
    )
)]
pub async fn delete(
    State(state): State<ProposalsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_proposal(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(ApiError::not_found(
            "PROPOSAL_NOT_FOUND",
            format!("Proposal not found: {}", path.id),
        ));
    }

    record_activity_best_effort(
        &state.pool,
        "proposal",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Transition a proposal's status, syncing the linked lead
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/status",
    tag = "proposals",
    params(("id" = String, Path, description = "Proposal ID")),
    request_body = SetProposalStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ProposalDto),
        (status = 404, description = "Proposal not found")
    )
)]
pub async fn set_status(
    State(state): State<ProposalsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<SetProposalStatusRequest>,
) -> Result<Json<ProposalDto>, ApiError> {
    let proposal = set_proposal_status(&state.pool, &path.id, body.status)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found(
                "PROPOSAL_NOT_FOUND",
                format!("Proposal not found: {}", path.id),
            )
        })?;

    record_activity_best_effort(
        &state.pool,
        "proposal",
        Some(&proposal.id),
        "status_changed",
        Some(body.status.as_str()),
        Some(&member.0),
    )
    .await;

    Ok(Json(ProposalDto::from(proposal)))
}
