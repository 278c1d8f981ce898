//! Dashboard endpoints and response types

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;

use super::AuthenticatedOrg;

/// Headline counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_assets: i64,
    pub checked_out: i64,
    pub overdue: i64,
    pub repair: i64,
    pub missing: i64,
}

/// Fleet health buckets derived from asset status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdown {
    pub good: i64,
    pub needs_attention: i64,
    pub out_of_service: i64,
}

/// One sampled point of the overdue trend
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueTrendPoint {
    pub date: String,
    pub overdue_count: i64,
}

/// Most-checked-out asset within the range
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopAsset {
    pub asset_id: String,
    pub name: String,
    pub checkout_count: i64,
}

/// Value of equipment currently unavailable
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValueAtRisk {
    pub overdue_value: f64,
    pub repair_value: f64,
    pub missing_value: f64,
    pub total_value: f64,
}

/// Compact asset row for the dashboard lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAsset {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Dashboard detail lists (capped at 5 entries each)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLists {
    pub overdue_assignments: Vec<DashboardAsset>,
    pub repair_assets: Vec<DashboardAsset>,
    pub missing_assets: Vec<DashboardAsset>,
}

/// Aggregated dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub counts: DashboardCounts,
    pub health_breakdown: HealthBreakdown,
    pub overdue_trend: Vec<OverdueTrendPoint>,
    pub top_assets: Vec<TopAsset>,
    pub value_at_risk: ValueAtRisk,
    pub lists: DashboardLists,
    pub insights: Vec<String>,
}

/// Dashboard query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// Trailing window, e.g. "30d" (default)
    pub range: Option<String>,
}

/// Aggregated dashboard summary for the organization
#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardData),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    AuthenticatedOrg(claims): AuthenticatedOrg,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardData>> {
    let data = state
        .services
        .dashboard
        .summary(&claims.org_id, query.range.as_deref())
        .await?;
    Ok(Json(data))
}
