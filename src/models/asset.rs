//! Asset model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::AssetStatus;

/// Asset record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i32,
    /// Organization (tenant) scope
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: AssetStatus,
    /// Opaque unique identifier printed as a QR label
    pub qr_code: String,
    /// Opaque image reference (data URI or URL), stored uninterpreted
    pub image_url: Option<String>,
    /// Replacement value used by the dashboard value-at-risk rollup
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Short asset representation embedded in assignment/incident responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetSummary {
    pub id: i32,
    pub name: String,
    pub status: AssetStatus,
    pub qr_code: String,
}

impl From<&Asset> for AssetSummary {
    fn from(asset: &Asset) -> Self {
        AssetSummary {
            id: asset.id,
            name: asset.name.clone(),
            status: asset.status,
            qr_code: asset.qr_code.clone(),
        }
    }
}

/// Create asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    /// Explicit QR code; generated when omitted
    pub qr_code: Option<String>,
    pub image_url: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

/// Update asset request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    /// Direct admin status override (distinct from automatic transitions)
    pub status: Option<AssetStatus>,
    pub image_url: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

impl UpdateAsset {
    /// Names of the fields present in this partial update
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name".to_string());
        }
        if self.description.is_some() {
            fields.push("description".to_string());
        }
        if self.status.is_some() {
            fields.push("status".to_string());
        }
        if self.image_url.is_some() {
            fields.push("image_url".to_string());
        }
        if self.estimated_value.is_some() {
            fields.push("estimated_value".to_string());
        }
        fields
    }
}

/// Asset list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    /// Case-insensitive substring match on name
    pub search: Option<String>,
    /// Exact status match
    pub status: Option<AssetStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_changed_fields_ordering() {
        let update = UpdateAsset {
            name: Some("Canon R5".to_string()),
            description: None,
            status: Some(AssetStatus::Retired),
            image_url: None,
            estimated_value: None,
        };
        assert_eq!(update.changed_fields(), vec!["name", "status"]);
    }

    #[test]
    fn test_create_asset_validation_bounds() {
        let valid = CreateAsset {
            name: "Canon R5".to_string(),
            description: None,
            qr_code: None,
            image_url: None,
            estimated_value: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateAsset {
            name: String::new(),
            description: None,
            qr_code: None,
            image_url: None,
            estimated_value: None,
        };
        assert!(empty_name.validate().is_err());

        let long_name = CreateAsset {
            name: "x".repeat(101),
            description: None,
            qr_code: None,
            image_url: None,
            estimated_value: None,
        };
        assert!(long_name.validate().is_err());

        let long_description = CreateAsset {
            name: "Tripod".to_string(),
            description: Some("y".repeat(501)),
            qr_code: None,
            image_url: None,
            estimated_value: None,
        };
        assert!(long_description.validate().is_err());
    }
}
