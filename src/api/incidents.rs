//! Incident tracking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::incident::{Incident, IncidentDetails, IncidentQuery, ReportIncident, UpdateIncident},
};

use super::AuthenticatedOrg;

/// Report an incident against an asset
#[utoipa::path(
    post,
    path = "/incidents",
    tag = "incidents",
    security(("bearer_auth" = [])),
    request_body = ReportIncident,
    responses(
        (status = 201, description = "Incident reported", body = Incident),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn report_incident(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Json(data): Json<ReportIncident>,
) -> AppResult<(StatusCode, Json<Incident>)> {
    let incident = state
        .services
        .incidents
        .report(&claims.org_id, &claims.sub, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// List incidents, newest first
#[utoipa::path(
    get,
    path = "/incidents",
    tag = "incidents",
    security(("bearer_auth" = [])),
    params(IncidentQuery),
    responses(
        (status = 200, description = "List of incidents", body = Vec<IncidentDetails>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_incidents(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Query(query): Query<IncidentQuery>,
) -> AppResult<Json<Vec<IncidentDetails>>> {
    claims.require_admin()?;

    let incidents = state.services.incidents.list(&claims.org_id, &query).await?;
    Ok(Json(incidents))
}

/// Get incident details by ID
#[utoipa::path(
    get,
    path = "/incidents/{id}",
    tag = "incidents",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident details", body = IncidentDetails),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Incident not found")
    )
)]
pub async fn get_incident(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(id): Path<i32>,
) -> AppResult<Json<IncidentDetails>> {
    claims.require_admin()?;

    let incident = state.services.incidents.get(&claims.org_id, id).await?;
    Ok(Json(incident))
}

/// Update an incident: change status, append notes, or archive
#[utoipa::path(
    put,
    path = "/incidents/{id}",
    tag = "incidents",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Incident ID")
    ),
    request_body = UpdateIncident,
    responses(
        (status = 200, description = "Incident updated", body = Incident),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Incident not found")
    )
)]
pub async fn update_incident(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Path(id): Path<i32>,
    Json(data): Json<UpdateIncident>,
) -> AppResult<Json<Incident>> {
    claims.require_admin()?;

    let incident = state
        .services
        .incidents
        .update(&claims.org_id, &claims.sub, id, &data)
        .await?;
    Ok(Json(incident))
}
