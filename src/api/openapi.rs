//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{activity, assets, assignments, dashboard, health, incidents};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Steward API",
        version = "0.3.0",
        description = "Equipment Inventory Tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        // Assignments
        assignments::checkout,
        assignments::checkin,
        assignments::list_active,
        assignments::list_history,
        assignments::history_for_asset,
        // Incidents
        incidents::report_incident,
        incidents::list_incidents,
        incidents::get_incident,
        incidents::update_incident,
        // Activity
        activity::list_activity,
        // Dashboard
        dashboard::get_summary,
    ),
    components(
        schemas(
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetSummary,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            crate::models::asset::AssetQuery,
            // Assignments
            crate::models::assignment::Assignment,
            crate::models::assignment::AssignmentDetails,
            crate::models::assignment::CheckoutRequest,
            // Incidents
            crate::models::incident::Incident,
            crate::models::incident::IncidentDetails,
            crate::models::incident::IncidentNote,
            crate::models::incident::ReportIncident,
            crate::models::incident::NewIncidentNote,
            crate::models::incident::UpdateIncident,
            crate::models::incident::IncidentQuery,
            // Activity
            crate::models::activity::ActivityLogEntry,
            crate::models::activity::ActivityQuery,
            // Enums
            crate::models::enums::AssetStatus,
            crate::models::enums::AssignmentStatus,
            crate::models::enums::IncidentSeverity,
            crate::models::enums::IncidentStatus,
            crate::models::enums::EventType,
            // Dashboard
            dashboard::DashboardData,
            dashboard::DashboardCounts,
            dashboard::HealthBreakdown,
            dashboard::OverdueTrendPoint,
            dashboard::TopAsset,
            dashboard::ValueAtRisk,
            dashboard::DashboardAsset,
            dashboard::DashboardLists,
            dashboard::DashboardQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "assets", description = "Asset registry"),
        (name = "assignments", description = "Checkout and check-in ledger"),
        (name = "incidents", description = "Incident tracking"),
        (name = "activity", description = "Audit activity log"),
        (name = "dashboard", description = "Aggregated dashboards")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
