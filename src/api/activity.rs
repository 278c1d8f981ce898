//! Activity log endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::activity::{ActivityLogEntry, ActivityQuery},
};

use super::AuthenticatedOrg;

/// List activity log entries, newest first
#[utoipa::path(
    get,
    path = "/activity",
    tag = "activity",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Activity log entries", body = Vec<ActivityLogEntry>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_activity(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityLogEntry>>> {
    claims.require_admin()?;

    let entries = state.services.activity.list(&claims.org_id, &query).await?;
    Ok(Json(entries))
}
