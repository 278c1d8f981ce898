//! Shared domain enums (stored as TEXT in Postgres)

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Asset lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AssetStatus {
    Available,
    #[serde(rename = "Checked Out")]
    CheckedOut,
    Maintenance,
    Retired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "Available",
            AssetStatus::CheckedOut => "Checked Out",
            AssetStatus::Maintenance => "Maintenance",
            AssetStatus::Retired => "Retired",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(AssetStatus::Available),
            "Checked Out" => Ok(AssetStatus::CheckedOut),
            "Maintenance" => Ok(AssetStatus::Maintenance),
            "Retired" => Ok(AssetStatus::Retired),
            _ => Err(format!("Invalid asset status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for AssetStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AssetStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AssetStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

// ---------------------------------------------------------------------------
// AssignmentStatus
// ---------------------------------------------------------------------------

/// Assignment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AssignmentStatus {
    Active,
    Returned,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Active => "Active",
            AssignmentStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(AssignmentStatus::Active),
            "Returned" => Ok(AssignmentStatus::Returned),
            _ => Err(format!("Invalid assignment status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for AssignmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AssignmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AssignmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

// ---------------------------------------------------------------------------
// IncidentSeverity
// ---------------------------------------------------------------------------

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentSeverity::Low => "Low",
            IncidentSeverity::Medium => "Medium",
            IncidentSeverity::High => "High",
            IncidentSeverity::Critical => "Critical",
        }
    }

    /// High/Critical incidents force the asset into Maintenance
    pub fn triggers_maintenance(&self) -> bool {
        matches!(self, IncidentSeverity::High | IncidentSeverity::Critical)
    }
}

impl std::fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IncidentSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(IncidentSeverity::Low),
            "Medium" => Ok(IncidentSeverity::Medium),
            "High" => Ok(IncidentSeverity::High),
            "Critical" => Ok(IncidentSeverity::Critical),
            _ => Err(format!("Invalid incident severity: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for IncidentSeverity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for IncidentSeverity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for IncidentSeverity {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

// ---------------------------------------------------------------------------
// IncidentStatus
// ---------------------------------------------------------------------------

/// Incident resolution workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum IncidentStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "Open",
            IncidentStatus::InProgress => "In Progress",
            IncidentStatus::Resolved => "Resolved",
            IncidentStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(IncidentStatus::Open),
            "In Progress" => Ok(IncidentStatus::InProgress),
            "Resolved" => Ok(IncidentStatus::Resolved),
            "Closed" => Ok(IncidentStatus::Closed),
            _ => Err(format!("Invalid incident status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for IncidentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for IncidentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for IncidentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Activity log event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    Updated,
    CheckedOut,
    CheckedIn,
    Deleted,
    IncidentReported,
    IncidentUpdated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Created => "created",
            EventType::Updated => "updated",
            EventType::CheckedOut => "checked_out",
            EventType::CheckedIn => "checked_in",
            EventType::Deleted => "deleted",
            EventType::IncidentReported => "incident_reported",
            EventType::IncidentUpdated => "incident_updated",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(EventType::Created),
            "updated" => Ok(EventType::Updated),
            "checked_out" => Ok(EventType::CheckedOut),
            "checked_in" => Ok(EventType::CheckedIn),
            "deleted" => Ok(EventType::Deleted),
            "incident_reported" => Ok(EventType::IncidentReported),
            "incident_updated" => Ok(EventType::IncidentUpdated),
            _ => Err(format!("Invalid event type: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for EventType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for EventType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for EventType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_status_labels_with_spaces() {
        assert_eq!(AssetStatus::CheckedOut.as_str(), "Checked Out");
        assert_eq!("Checked Out".parse::<AssetStatus>(), Ok(AssetStatus::CheckedOut));
        assert!("CheckedOut".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn test_asset_status_serde_uses_display_labels() {
        let json = serde_json::to_string(&AssetStatus::CheckedOut).unwrap();
        assert_eq!(json, "\"Checked Out\"");
        let parsed: AssetStatus = serde_json::from_str("\"Maintenance\"").unwrap();
        assert_eq!(parsed, AssetStatus::Maintenance);
    }

    #[test]
    fn test_severity_maintenance_trigger() {
        assert!(!IncidentSeverity::Low.triggers_maintenance());
        assert!(!IncidentSeverity::Medium.triggers_maintenance());
        assert!(IncidentSeverity::High.triggers_maintenance());
        assert!(IncidentSeverity::Critical.triggers_maintenance());
    }

    #[test]
    fn test_incident_status_in_progress_label() {
        assert_eq!(IncidentStatus::InProgress.as_str(), "In Progress");
        assert_eq!("In Progress".parse::<IncidentStatus>(), Ok(IncidentStatus::InProgress));
    }

    #[test]
    fn test_event_type_snake_case() {
        assert_eq!(EventType::IncidentReported.as_str(), "incident_reported");
        assert_eq!("checked_in".parse::<EventType>(), Ok(EventType::CheckedIn));
        let json = serde_json::to_string(&EventType::CheckedOut).unwrap();
        assert_eq!(json, "\"checked_out\"");
    }
}
