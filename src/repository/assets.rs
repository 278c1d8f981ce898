//! Assets repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{ActivityDetail, NewActivityEntry},
        asset::{Asset, AssetQuery, CreateAsset, UpdateAsset},
        enums::AssetStatus,
    },
};

use super::activity;

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get asset by ID within an organization
    pub async fn get_by_id(&self, org_id: &str, id: i32) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    /// List assets, newest first, with optional search/status filter
    pub async fn list(&self, org_id: &str, query: &AssetQuery) -> AppResult<Vec<Asset>> {
        let mut conditions = vec!["org_id = $1".to_string()];
        let mut idx = 2;

        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.search.is_some() {
            conditions.push(format!("name ILIKE ${}", idx));
        }

        let sql = format!(
            "SELECT * FROM assets WHERE {} ORDER BY created_at DESC",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Asset>(&sql).bind(org_id);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        if let Some(ref search) = query.search {
            builder = builder.bind(format!("%{}%", search));
        }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Create an asset and append the `created` activity entry in the
    /// same transaction
    pub async fn create(
        &self,
        org_id: &str,
        actor_id: &str,
        data: &CreateAsset,
        qr_code: &str,
    ) -> AppResult<Asset> {
        let mut tx = self.pool.begin().await?;

        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (org_id, name, description, status, qr_code, image_url, estimated_value, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(AssetStatus::Available)
        .bind(qr_code)
        .bind(&data.image_url)
        .bind(data.estimated_value)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "QR code '{}' is already in use",
                        qr_code
                    ));
                }
            }
            AppError::Database(e)
        })?;

        activity::append_in_tx(
            &mut tx,
            NewActivityEntry {
                org_id: org_id.to_string(),
                asset_id: asset.id,
                asset_name: asset.name.clone(),
                actor_id: actor_id.to_string(),
                detail: ActivityDetail::Created {
                    status: asset.status,
                },
            },
        )
        .await?;

        tx.commit().await?;
        Ok(asset)
    }

    /// Partially update an asset and append the `updated` activity entry
    /// in the same transaction. A status change here is a direct admin
    /// override, distinct from automatic transitions.
    pub async fn update(
        &self,
        org_id: &str,
        actor_id: &str,
        id: i32,
        data: &UpdateAsset,
    ) -> AppResult<Asset> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))?;

        let previous_status = current.status;
        let name = data.name.clone().unwrap_or(current.name);
        let description = data.description.clone().or(current.description);
        let status = data.status.unwrap_or(current.status);
        let image_url = data.image_url.clone().or(current.image_url);
        let estimated_value = data.estimated_value.or(current.estimated_value);

        let asset = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET name = $1, description = $2, status = $3, image_url = $4,
                estimated_value = $5, updated_by = $6, updated_at = $7
            WHERE id = $8 AND org_id = $9
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(status)
        .bind(&image_url)
        .bind(estimated_value)
        .bind(actor_id)
        .bind(Utc::now())
        .bind(id)
        .bind(org_id)
        .fetch_one(&mut *tx)
        .await?;

        activity::append_in_tx(
            &mut tx,
            NewActivityEntry {
                org_id: org_id.to_string(),
                asset_id: asset.id,
                asset_name: asset.name.clone(),
                actor_id: actor_id.to_string(),
                detail: ActivityDetail::Updated {
                    previous_status,
                    new_status: asset.status,
                    updates: data.changed_fields(),
                    reason: None,
                },
            },
        )
        .await?;

        tx.commit().await?;
        Ok(asset)
    }

    /// Delete an asset. Only permitted while `Available` and with no
    /// active assignment; the `deleted` activity entry is written before
    /// the row goes away.
    pub async fn delete(&self, org_id: &str, actor_id: &str, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let asset = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))?;

        let has_active_assignment: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assignments WHERE asset_id = $1 AND status = 'Active')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_active_assignment {
            return Err(AppError::Conflict(
                "Asset has an active assignment and cannot be deleted".to_string(),
            ));
        }
        if asset.status != AssetStatus::Available {
            return Err(AppError::Conflict(format!(
                "Only available assets can be deleted. Current status: {}",
                asset.status
            )));
        }

        activity::append_in_tx(
            &mut tx,
            NewActivityEntry {
                org_id: org_id.to_string(),
                asset_id: asset.id,
                asset_name: asset.name.clone(),
                actor_id: actor_id.to_string(),
                detail: ActivityDetail::Deleted,
            },
        )
        .await?;

        sqlx::query("DELETE FROM assets WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
