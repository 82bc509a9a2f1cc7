//! Shared link API endpoints

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
use crate::data::sqlite::repositories::link::{
    LinkPatch, NewLink, create_link, delete_link, get_link, list_links, update_link,
};

use types::{CreateLinkRequest, LinkDto, ListLinksQuery, UpdateLinkRequest};

/// Shared state for Link API endpoints
#[derive(Clone)]
pub struct LinksApiState {
    pub pool: SqlitePool,
}

/// Build Link API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .with_state(LinksApiState { pool })
}

fn link_not_found(id: &str) -> ApiError {
    ApiError::not_found("LINK_NOT_FOUND", format!("Link not found: {}", id))
}

/// List shared links, newest first
#[utoipa::path(
    get,
    path = "/api/links",
    tag = "links",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of links with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<LinksApiState>,
    ValidatedQuery(query): ValidatedQuery<ListLinksQuery>,
) -> Result<Json<PaginatedResponse<LinkDto>>, ApiError> {
    let (rows, total) = list_links(&state.pool, query.page, query.limit)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<LinkDto> = rows.into_iter().map(LinkDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Save a shared link. URLs are unique across the workspace.
#[utoipa::path(
    post,
    path = "/api/links",
    tag = "links",
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Link created", body = LinkDto),
        (status = 400, description = "Duplicate URL")
    )
)]
pub async fn create(
    State(state): State<LinksApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkDto>), ApiError> {
    let link = create_link(
        &state.pool,
        &NewLink {
            title: body.title,
            url: body.url,
            category: body.category,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "link",
        Some(&link.id),
        "created",
        Some(&link.title),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(LinkDto::from(link))))
}

/// Get a single link by ID
#[utoipa::path(
    get,
    path = "/api/links/{id}",
    tag = "links",
    params(("id" = String, Path, description = "Link ID")),
    responses(
        (status = 200, description = "Link details", body = LinkDto),
        (status = 404, description = "Link not found")
    )
)]
pub async fn get_one(
    State(state): State<LinksApiState>,
    path: IdPath,
) -> Result<Json<LinkDto>, ApiError> {
    let link = get_link(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| link_not_found(&path.id))?;
    Ok(Json(LinkDto::from(link)))
}

/// Update a link
#[utoipa::path(
    put,
    path = "/api/links/{id}",
    tag = "links",
    params(("id" = String, Path, description = "Link ID")),
    request_body = UpdateLinkRequest,
    responses(
        (status = 200, description = "Link updated", body = LinkDto),
        (status = 404, description = "Link not found")
    )
)]
pub async fn update(
    State(state): State<LinksApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateLinkRequest>,
) -> Result<Json<LinkDto>, ApiError> {
    let link = update_link(
        &state.pool,
        &path.id,
        &LinkPatch {
            title: body.title,
            url: body.url,
            category: body.category,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| link_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "link",
        Some(&link.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(LinkDto::from(link)))
}

/// Delete a link
#[utoipa::path(
    delete,
    path = "/api/links/{id}",
    tag = "links",
    params(("id" = String, Path, description = "Link ID")),
    responses(
        (status = 204, description = "Link deleted"),
        (status = 404, description = "Link not found")
    )
)]
pub async fn delete(
    State(state): State<LinksApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_link(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(link_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "link",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
