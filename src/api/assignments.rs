//! Assignment (checkout/check-in) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::assignment::{Assignment, AssignmentDetails, CheckoutRequest},
};

use super::AuthenticatedOrg;

/// Check an asset out to a member
#[utoipa::path(
    post,
    path = "/assignments/checkout",
    tag = "assignments",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Asset checked out", body = Assignment),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset is not available")
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    let assignment = state
        .services
        .assignments
        .checkout(&claims.org_id, &claims.sub, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Check an asset back in
#[utoipa::path(
    post,
    path = "/assignments/checkin/{asset_id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("asset_id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset checked in", body = Assignment),
        (status = 404, description = "No active assignment for this asset")
    )
)]
pub async fn checkin(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(asset_id): Path<i32>,
) -> AppResult<Json<Assignment>> {
    let assignment = state
        .services
        .assignments
        .checkin(&claims.org_id, &claims.sub, asset_id)
        .await?;
    Ok(Json(assignment))
}

/// List active assignments. Members see only their own.
#[utoipa::path(
    get,
    path = "/assignments/active",
    tag = "assignments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active assignments", body = Vec<AssignmentDetails>)
    )
)]
pub async fn list_active(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    let assigned_to = (!claims.is_admin()).then_some(claims.sub.as_str());
    let assignments = state
        .services
        .assignments
        .list_active(&claims.org_id, assigned_to)
        .await?;
    Ok(Json(assignments))
}

/// List returned assignments, most recently returned first. Members see
/// only their own.
#[utoipa::path(
    get,
    path = "/assignments/history",
    tag = "assignments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assignment history", body = Vec<AssignmentDetails>)
    )
)]
pub async fn list_history(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    let assigned_to = (!claims.is_admin()).then_some(claims.sub.as_str());
    let assignments = state
        .services
        .assignments
        .list_history(&claims.org_id, assigned_to)
        .await?;
    Ok(Json(assignments))
}

/// Full assignment history for one asset
#[utoipa::path(
    get,
    path = "/assignments/history/{asset_id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("asset_id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Assignment history for the asset", body = Vec<AssignmentDetails>),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn history_for_asset(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(asset_id): Path<i32>,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    claims.require_admin()?;

    let assignments = state
        .services
        .assignments
        .history_for_asset(&claims.org_id, asset_id)
        .await?;
    Ok(Json(assignments))
}
