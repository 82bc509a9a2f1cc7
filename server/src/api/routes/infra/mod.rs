//! Infrastructure asset API endpoints

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
use crate::data::sqlite::repositories::infra::{
    AssetPatch, NewAsset, create_asset, delete_asset, get_asset, list_assets, update_asset,
};

use types::{CreateAssetRequest, InfraAssetDto, ListAssetsQuery, UpdateAssetRequest};

/// Shared state for Infrastructure API endpoints
#[derive(Clone)]
pub struct InfraApiState {
    pub pool: SqlitePool,
}

/// Build Infrastructure API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .with_state(InfraApiState { pool })
}

fn asset_not_found(id: &str) -> ApiError {
    ApiError::not_found("ASSET_NOT_FOUND", format!("Asset not found: {}", id))
}

/// List assets, newest first, optionally filtered by type
#[utoipa::path(
    get,
    path = "/api/infra",
    tag = "infra",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("type" = Option<String>, Query, description = "Filter by asset type")
    ),
    responses(
        (status = 200, description = "List of assets with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<InfraApiState>,
    ValidatedQuery(query): ValidatedQuery<ListAssetsQuery>,
) -> Result<Json<PaginatedResponse<InfraAssetDto>>, ApiError> {
    let (rows, total) = list_assets(
        &state.pool,
        query.page,
        query.limit,
        query.asset_type.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<InfraAssetDto> = rows.into_iter().map(InfraAssetDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Register an infrastructure asset
#[utoipa::path(
    post,
    path = "/api/infra",
    tag = "infra",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = InfraAssetDto),
        (status = 400, description = "Invalid type or metadata")
    )
)]
pub async fn create(
    State(state): State<InfraApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateAssetRequest>,
) -> Result<(StatusCode, Json<InfraAssetDto>), ApiError> {
    let asset = create_asset(
        &state.pool,
        &NewAsset {
            name: body.name,
            asset_type: body.asset_type,
            provider: body.provider,
            status: body.status,
            metadata: body.metadata.map(|m| m.to_string()),
            expires_at: body.expires_at,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "infra",
        Some(&asset.id),
        "created",
        Some(&asset.name),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(InfraAssetDto::from(asset))))
}

/// Get a single asset by ID
#[utoipa::path(
    get,
    path = "/api/infra/{id}",
    tag = "infra",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = InfraAssetDto),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_one(
    State(state): State<InfraApiState>,
    path: IdPath,
) -> Result<Json<InfraAssetDto>, ApiError> {
    let asset = get_asset(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| asset_not_found(&path.id))?;
    Ok(Json(InfraAssetDto::from(asset)))
}

/// Update an asset. The type cannot change after creation.
#[utoipa::path(
    put,
    path = "/api/infra/{id}",
    tag = "infra",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = InfraAssetDto),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update(
    State(state): State<InfraApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateAssetRequest>,
) -> Result<Json<InfraAssetDto>, ApiError> {
    let asset = update_asset(
        &state.pool,
        &path.id,
        &AssetPatch {
            name: body.name,
            provider: body.provider,
            status: body.status,
            metadata: body.metadata.map(|m| m.to_string()),
            expires_at: body.expires_at,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| asset_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "infra",
        Some(&asset.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(InfraAssetDto::from(asset)))
}

/// Delete an asset, removing any project links
#[utoipa::path(
    delete,
    path = "/api/infra/{id}",
    tag = "infra",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete(
    State(state): State<InfraApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_asset(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(asset_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "infra",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
