//! Assignment (checkout) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::asset::AssetSummary;
use super::enums::AssignmentStatus;

/// Assignment model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: i32,
    pub org_id: String,
    pub asset_id: i32,
    /// Member the asset is checked out to
    pub assigned_to: String,
    /// Admin who performed the checkout
    pub assigned_by: String,
    pub checked_out_at: DateTime<Utc>,
    pub expected_return_at: Option<DateTime<Utc>>,
    /// Null while the assignment is active
    pub actual_return_at: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    /// Opaque condition photo reference captured at checkout
    pub condition_photo_url: Option<String>,
    /// Free-form tags, e.g. ["Wedding", "Concert"]
    #[schema(value_type = Option<Vec<String>>)]
    pub event_tags: Option<Json<Vec<String>>>,
}

impl Assignment {
    /// Overdue is derived, never stored: active with an expected return
    /// strictly in the past.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == AssignmentStatus::Active
            && self.expected_return_at.map(|due| due < now).unwrap_or(false)
    }
}

/// Assignment with embedded asset summary for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDetails {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub asset: Option<AssetSummary>,
    pub is_overdue: bool,
}

impl AssignmentDetails {
    pub fn new(assignment: Assignment, asset: Option<AssetSummary>, now: DateTime<Utc>) -> Self {
        let is_overdue = assignment.is_overdue(now);
        AssignmentDetails {
            assignment,
            asset,
            is_overdue,
        }
    }
}

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    pub asset_id: i32,
    #[validate(length(min = 1, message = "assigned_to is required"))]
    pub assigned_to: String,
    pub expected_return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub condition_photo_url: Option<String>,
    pub event_tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assignment(status: AssignmentStatus, due: Option<DateTime<Utc>>) -> Assignment {
        Assignment {
            id: 1,
            org_id: "org_1".to_string(),
            asset_id: 7,
            assigned_to: "user_42".to_string(),
            assigned_by: "user_admin".to_string(),
            checked_out_at: Utc::now() - Duration::days(10),
            expected_return_at: due,
            actual_return_at: None,
            status,
            notes: None,
            condition_photo_url: None,
            event_tags: None,
        }
    }

    #[test]
    fn test_overdue_requires_past_due_date() {
        let now = Utc::now();
        let overdue = assignment(AssignmentStatus::Active, Some(now - Duration::hours(1)));
        assert!(overdue.is_overdue(now));

        let due_later = assignment(AssignmentStatus::Active, Some(now + Duration::hours(1)));
        assert!(!due_later.is_overdue(now));
    }

    #[test]
    fn test_overdue_is_false_without_due_date() {
        let now = Utc::now();
        let open_ended = assignment(AssignmentStatus::Active, None);
        assert!(!open_ended.is_overdue(now));
    }

    #[test]
    fn test_returned_assignment_is_never_overdue() {
        let now = Utc::now();
        let returned = assignment(AssignmentStatus::Returned, Some(now - Duration::days(3)));
        assert!(!returned.is_overdue(now));
    }
}
