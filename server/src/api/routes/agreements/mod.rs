//! Agreement API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::agreement::{
    AgreementPatch, NewAgreement, create_agreement, delete_agreement, get_agreement,
    list_agreements, update_agreement,
};

use types::{AgreementDto, CreateAgreementRequest, ListAgreementsQuery, UpdateAgreementRequest};

/// Shared state for Agreement API endpoints
#[derive(Clone)]
pub struct AgreementsApiState {
    pub pool: SqlitePool,
}

/// Build Agreement API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .with_state(AgreementsApiState { pool })
}

fn agreement_not_found(id: &str) -> ApiError {
    ApiError::not_found(
        "AGREEMENT_NOT_FOUND",
        format!("Agreement not found: {}", id),
    )
}

/// List agreements, newest first
#[utoipa::path(
    get,
    path = "/api/agreements",
    tag = "agreements",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of agreements with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<AgreementsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListAgreementsQuery>,
) -> Result<Json<PaginatedResponse<AgreementDto>>, ApiError> {
    let (rows, total) = list_agreements(&state.pool, query.page, query.limit)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<AgreementDto> = rows.into_iter().map(AgreementDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create an agreement
#[utoipa::path(
    post,
    path = "/api/agreements",
    tag = "agreements",
    request_body = CreateAgreementRequest,
    responses(
        (status = 201, description = "Agreement created", body = AgreementDto)
    )
)]
pub async fn create(
    State(state): State<AgreementsApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateAgreementRequest>,
) -> Result<(StatusCode, Json<AgreementDto>), ApiError> {
    let agreement = create_agreement(
        &state.pool,
        &NewAgreement {
            title: body.title,
            party: body.party,
            kind: body.kind,
            status: body.status,
            body: body.body,
            signed_at: body.signed_at,
            expires_at: body.expires_at,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "agreement",
        Some(&agreement.id),
        "created",
        Some(&agreement.title),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(AgreementDto::from(agreement))))
}

/// Get a single agreement by ID
#[utoipa::path(
    get,
    path = "/api/agreements/{id}",
    tag = "agreements",
    params(("id" = String, Path, description = "Agreement ID")),
    responses(
        (status = 200, description = "Agreement details", body = AgreementDto),
        (status = 404, description = "Agreement not found")
    )
)]
pub async fn get_one(
    State(state): State<AgreementsApiState>,
    path: IdPath,
) -> Result<Json<AgreementDto>, ApiError> {
    let agreement = get_agreement(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| agreement_not_found(&path.id))?;
    Ok(Json(AgreementDto::from(agreement)))
}

/// Update an agreement
#[utoipa::path(
    put,
    path = "/api/agreements/{id}",
    tag = "agreements",
    params(("id" = String, Path, description = "Agreement ID")),
    request_body = UpdateAgreementRequest,
    responses(
        (status = 200, description = "Agreement updated", body = AgreementDto),
        (status = 404, description = "Agreement not found")
    )
)]
pub async fn update(
    State(state): State<AgreementsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateAgreementRequest>,
) -> Result<Json<AgreementDto>, ApiError> {
    let agreement = update_agreement(
        &state.pool,
        &path.id,
        &AgreementPatch {
            title: body.title,
            party: body.party,
            kind: body.kind,
            status: body.status,
            body: body.body,
            signed_at: body.signed_at,
            expires_at: body.expires_at,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| agreement_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "agreement",
        Some(&agreement.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(AgreementDto::from(agreement)))
}

/// Delete an agreement
#[utoipa::path(
    delete,
    path = "/api/agreements/{id}",
    tag = "agreements",
    params(("id" = String, Path, description = "Agreement ID")),
    responses(
        (status = 204, description = "Agreement deleted"),
        (status = 404, description = "Agreement not found")
    )
)]
pub async fn delete(
    State(state): State<AgreementsApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_agreement(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(agreement_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "agreement",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
