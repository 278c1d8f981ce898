//! Activity log model and event detail types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{AssetStatus, EventType, IncidentSeverity, IncidentStatus};

/// Actor id recorded for automatic transitions
pub const SYSTEM_ACTOR: &str = "system";

/// Activity log entry from database. The `details` payload is the
/// untagged projection of an [`ActivityDetail`]; `event_type` is the tag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityLogEntry {
    pub id: i32,
    pub org_id: String,
    /// Plain reference (no foreign key): entries outlive their asset
    pub asset_id: i32,
    /// Denormalized so history survives asset deletion
    pub asset_name: String,
    /// Member id, or "system" for automatic transitions
    pub actor_id: String,
    pub event_type: EventType,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Event-specific payload for each state-changing operation. One variant
/// per event type; the write path only accepts these, never free-form
/// JSON.
#[derive(Debug, Clone)]
pub enum ActivityDetail {
    Created {
        status: AssetStatus,
    },
    Updated {
        previous_status: AssetStatus,
        new_status: AssetStatus,
        updates: Vec<String>,
        /// Set for automatic transitions (incident overrides, lifecycle)
        reason: Option<String>,
    },
    CheckedOut {
        assigned_to: String,
        expected_return_at: Option<DateTime<Utc>>,
    },
    CheckedIn {
        returned_at: DateTime<Utc>,
    },
    Deleted,
    IncidentReported {
        incident_id: i32,
        title: String,
        severity: IncidentSeverity,
    },
    IncidentUpdated {
        incident_id: i32,
        previous_status: IncidentStatus,
        new_status: IncidentStatus,
        reason: Option<String>,
    },
}

impl ActivityDetail {
    /// The event type this detail is stored under
    pub fn event_type(&self) -> EventType {
        match self {
            ActivityDetail::Created { .. } => EventType::Created,
            ActivityDetail::Updated { .. } => EventType::Updated,
            ActivityDetail::CheckedOut { .. } => EventType::CheckedOut,
            ActivityDetail::CheckedIn { .. } => EventType::CheckedIn,
            ActivityDetail::Deleted => EventType::Deleted,
            ActivityDetail::IncidentReported { .. } => EventType::IncidentReported,
            ActivityDetail::IncidentUpdated { .. } => EventType::IncidentUpdated,
        }
    }

    /// Untagged JSON payload for the `details` column. `Deleted` carries
    /// no payload.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            ActivityDetail::Created { status } => Some(json!({ "status": status })),
            ActivityDetail::Updated {
                previous_status,
                new_status,
                updates,
                reason,
            } => {
                let mut value = json!({
                    "previous_status": previous_status,
                    "new_status": new_status,
                    "updates": updates,
                });
                if let Some(reason) = reason {
                    value["reason"] = json!(reason);
                }
                Some(value)
            }
            ActivityDetail::CheckedOut {
                assigned_to,
                expected_return_at,
            } => Some(json!({
                "assigned_to": assigned_to,
                "expected_return_at": expected_return_at,
            })),
            ActivityDetail::CheckedIn { returned_at } => {
                Some(json!({ "returned_at": returned_at }))
            }
            ActivityDetail::Deleted => None,
            ActivityDetail::IncidentReported {
                incident_id,
                title,
                severity,
            } => Some(json!({
                "incident_id": incident_id,
                "title": title,
                "severity": severity,
            })),
            ActivityDetail::IncidentUpdated {
                incident_id,
                previous_status,
                new_status,
                reason,
            } => {
                let mut value = json!({
                    "incident_id": incident_id,
                    "previous_status": previous_status,
                    "new_status": new_status,
                });
                if let Some(reason) = reason {
                    value["reason"] = json!(reason);
                }
                Some(value)
            }
        }
    }
}

/// A log entry about to be appended, before ids/timestamps are assigned
#[derive(Debug, Clone)]
pub struct NewActivityEntry {
    pub org_id: String,
    pub asset_id: i32,
    pub asset_name: String,
    pub actor_id: String,
    pub detail: ActivityDetail,
}

/// Activity list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    /// Case-insensitive match on asset name, actor id or event type
    pub search: Option<String>,
    pub asset_id: Option<i32>,
    pub event_type: Option<EventType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_event_type_projection() {
        let detail = ActivityDetail::CheckedOut {
            assigned_to: "user_42".to_string(),
            expected_return_at: None,
        };
        assert_eq!(detail.event_type(), EventType::CheckedOut);
        assert_eq!(ActivityDetail::Deleted.event_type(), EventType::Deleted);
    }

    #[test]
    fn test_updated_detail_payload_shape() {
        let detail = ActivityDetail::Updated {
            previous_status: AssetStatus::Available,
            new_status: AssetStatus::Maintenance,
            updates: vec!["status".to_string()],
            reason: Some("Incident #3 reported with Critical severity".to_string()),
        };
        let value = detail.to_json().unwrap();
        assert_eq!(value["previous_status"], "Available");
        assert_eq!(value["new_status"], "Maintenance");
        assert_eq!(value["updates"][0], "status");
        assert!(value["reason"].as_str().unwrap().starts_with("Incident #3"));
    }

    #[test]
    fn test_updated_detail_omits_absent_reason() {
        let detail = ActivityDetail::Updated {
            previous_status: AssetStatus::Available,
            new_status: AssetStatus::Retired,
            updates: vec!["status".to_string()],
            reason: None,
        };
        let value = detail.to_json().unwrap();
        assert!(value.get("reason").is_none());
    }

    #[test]
    fn test_deleted_detail_has_no_payload() {
        assert!(ActivityDetail::Deleted.to_json().is_none());
    }

    #[test]
    fn test_incident_reported_detail_payload() {
        let detail = ActivityDetail::IncidentReported {
            incident_id: 9,
            title: "Lens cracked".to_string(),
            severity: IncidentSeverity::Critical,
        };
        let value = detail.to_json().unwrap();
        assert_eq!(value["incident_id"], 9);
        assert_eq!(value["severity"], "Critical");
    }
}
