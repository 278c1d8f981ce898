//! Asset registry service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::asset::{Asset, AssetQuery, CreateAsset, UpdateAsset},
    repository::Repository,
};

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
}

impl AssetsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List assets with optional search/status filter
    pub async fn list(&self, org_id: &str, query: &AssetQuery) -> AppResult<Vec<Asset>> {
        self.repository.assets.list(org_id, query).await
    }

    /// Get asset by ID
    pub async fn get(&self, org_id: &str, id: i32) -> AppResult<Asset> {
        self.repository.assets.get_by_id(org_id, id).await
    }

    /// Register a new asset, generating a QR code when none is supplied
    pub async fn create(&self, org_id: &str, actor_id: &str, data: &CreateAsset) -> AppResult<Asset> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let qr_code = match &data.qr_code {
            Some(code) if !code.trim().is_empty() => code.clone(),
            _ => format!("QR-{}", Uuid::new_v4()),
        };

        self.repository
            .assets
            .create(org_id, actor_id, data, &qr_code)
            .await
    }

    /// Partially update an asset
    pub async fn update(
        &self,
        org_id: &str,
        actor_id: &str,
        id: i32,
        data: &UpdateAsset,
    ) -> AppResult<Asset> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.assets.update(org_id, actor_id, id, data).await
    }

    /// Delete an asset (only while available and unassigned)
    pub async fn delete(&self, org_id: &str, actor_id: &str, id: i32) -> AppResult<()> {
        self.repository.assets.delete(org_id, actor_id, id).await
    }
}
