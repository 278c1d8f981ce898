//! Asset registry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::asset::{Asset, AssetQuery, CreateAsset, UpdateAsset},
};

use super::AuthenticatedOrg;

/// List assets with optional search and status filter
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "List of assets", body = Vec<Asset>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<Vec<Asset>>> {
    let assets = state.services.assets.list(&claims.org_id, &query).await?;
    Ok(Json(assets))
}

/// Get asset details by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(id): Path<i32>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.assets.get(&claims.org_id, id).await?;
    Ok(Json(asset))
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "QR code already in use")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    claims.require_admin()?;

    let asset = state
        .services
        .assets
        .create(&claims.org_id, &claims.sub, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Partially update an asset. Including `status` is a direct admin
/// override of the lifecycle state.
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    claims.require_admin()?;

    let asset = state
        .services
        .assets
        .update(&claims.org_id, &claims.sub, id, &data)
        .await?;
    Ok(Json(asset))
}

/// Delete an asset (only while available and unassigned)
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset is checked out or has an active assignment")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .assets
        .delete(&claims.org_id, &claims.sub, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
