//! Incident model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::asset::AssetSummary;
use super::enums::{IncidentSeverity, IncidentStatus};

/// A note appended to an incident
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentNote {
    pub text: String,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

/// Incident record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Incident {
    pub id: i32,
    pub org_id: String,
    pub asset_id: i32,
    pub reported_by: String,
    pub title: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    /// Ordered, append-only list of notes
    #[schema(value_type = Vec<IncidentNote>)]
    pub notes: Json<Vec<IncidentNote>>,
    /// Opaque photo reference, stored uninterpreted
    pub photo_url: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incident with embedded asset summary for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentDetails {
    #[serde(flatten)]
    pub incident: Incident,
    pub asset: Option<AssetSummary>,
}

/// Report incident request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportIncident {
    pub asset_id: i32,
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,
    pub severity: IncidentSeverity,
    pub photo_url: Option<String>,
}

/// A new note in an update request; actor and timestamp are stamped
/// server-side.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewIncidentNote {
    #[validate(length(min = 1, message = "Note text must not be empty"))]
    pub text: String,
}

/// Update incident request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateIncident {
    pub status: Option<IncidentStatus>,
    #[validate(nested)]
    pub notes: Option<Vec<NewIncidentNote>>,
    pub is_archived: Option<bool>,
}

/// Incident list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct IncidentQuery {
    pub status: Option<IncidentStatus>,
    pub severity: Option<IncidentSeverity>,
    #[serde(default)]
    pub include_archived: bool,
}
