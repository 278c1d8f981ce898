//! Assignments repository for database operations

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{ActivityDetail, NewActivityEntry},
        asset::{Asset, AssetSummary},
        assignment::{Assignment, AssignmentDetails, CheckoutRequest},
        enums::{AssetStatus, AssignmentStatus},
    },
};

use super::activity;

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Check an asset out to a member. The asset row is locked for the
    /// duration of the transaction and its status re-checked under the
    /// lock, so concurrent checkouts of the same asset serialize and
    /// exactly one succeeds.
    pub async fn checkout(
        &self,
        org_id: &str,
        admin_id: &str,
        request: &CheckoutRequest,
    ) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let asset = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(request.asset_id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", request.asset_id)))?;

        if asset.status != AssetStatus::Available {
            return Err(AppError::Conflict(format!(
                "Asset is not available for checkout. Current status: {}",
                asset.status
            )));
        }

        let now = Utc::now();

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments
                (org_id, asset_id, assigned_to, assigned_by, checked_out_at,
                 expected_return_at, status, notes, condition_photo_url, event_tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(request.asset_id)
        .bind(&request.assigned_to)
        .bind(admin_id)
        .bind(now)
        .bind(request.expected_return_at)
        .bind(AssignmentStatus::Active)
        .bind(&request.notes)
        .bind(&request.condition_photo_url)
        .bind(request.event_tags.clone().map(Json))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE assets SET status = $1 WHERE id = $2")
            .bind(AssetStatus::CheckedOut)
            .bind(asset.id)
            .execute(&mut *tx)
            .await?;

        activity::append_in_tx(
            &mut tx,
            NewActivityEntry {
                org_id: org_id.to_string(),
                asset_id: asset.id,
                asset_name: asset.name.clone(),
                actor_id: admin_id.to_string(),
                detail: ActivityDetail::CheckedOut {
                    assigned_to: request.assigned_to.clone(),
                    expected_return_at: request.expected_return_at,
                },
            },
        )
        .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// Check an asset back in. Restores the asset to `Available` only
    /// when it is still `Checked Out`: a Maintenance/Retired status set
    /// by an incident during the loan wins and is preserved.
    pub async fn checkin(&self, org_id: &str, actor_id: &str, asset_id: i32) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE asset_id = $1 AND org_id = $2 AND status = 'Active'
            FOR UPDATE
            "#,
        )
        .bind(asset_id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No active assignment found for this asset".to_string())
        })?;

        let now = Utc::now();

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET status = $1, actual_return_at = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(AssignmentStatus::Returned)
        .bind(now)
        .bind(assignment.id)
        .fetch_one(&mut *tx)
        .await?;

        let asset = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(asset_id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", asset_id)))?;

        if asset.status == AssetStatus::CheckedOut {
            sqlx::query("UPDATE assets SET status = $1 WHERE id = $2")
                .bind(AssetStatus::Available)
                .bind(asset.id)
                .execute(&mut *tx)
                .await?;
        }

        activity::append_in_tx(
            &mut tx,
            NewActivityEntry {
                org_id: org_id.to_string(),
                asset_id: asset.id,
                asset_name: asset.name.clone(),
                actor_id: actor_id.to_string(),
                detail: ActivityDetail::CheckedIn { returned_at: now },
            },
        )
        .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// List active assignments, optionally restricted to one assignee
    pub async fn list_active(
        &self,
        org_id: &str,
        assigned_to: Option<&str>,
    ) -> AppResult<Vec<AssignmentDetails>> {
        self.list_with_asset(
            org_id,
            assigned_to,
            "a.status = 'Active'",
            "a.checked_out_at DESC",
            None,
        )
        .await
    }

    /// List returned assignments, most recently returned first
    pub async fn list_history(
        &self,
        org_id: &str,
        assigned_to: Option<&str>,
    ) -> AppResult<Vec<AssignmentDetails>> {
        self.list_with_asset(
            org_id,
            assigned_to,
            "a.status = 'Returned'",
            "a.actual_return_at DESC",
            None,
        )
        .await
    }

    /// Full assignment history for one asset, newest checkout first
    pub async fn history_for_asset(
        &self,
        org_id: &str,
        asset_id: i32,
    ) -> AppResult<Vec<AssignmentDetails>> {
        self.list_with_asset(org_id, None, "TRUE", "a.checked_out_at DESC", Some(asset_id))
            .await
    }

    async fn list_with_asset(
        &self,
        org_id: &str,
        assigned_to: Option<&str>,
        status_cond: &str,
        order_by: &str,
        asset_id: Option<i32>,
    ) -> AppResult<Vec<AssignmentDetails>> {
        let mut conditions = vec!["a.org_id = $1".to_string(), status_cond.to_string()];
        let mut idx = 2;

        if assigned_to.is_some() {
            conditions.push(format!("a.assigned_to = ${}", idx));
            idx += 1;
        }
        if asset_id.is_some() {
            conditions.push(format!("a.asset_id = ${}", idx));
        }

        let sql = format!(
            r#"
            SELECT a.*, s.name AS asset_name, s.status AS asset_status, s.qr_code AS asset_qr_code
            FROM assignments a
            JOIN assets s ON a.asset_id = s.id
            WHERE {}
            ORDER BY {}
            "#,
            conditions.join(" AND "),
            order_by
        );

        let mut builder = sqlx::query(&sql).bind(org_id);
        if let Some(assignee) = assigned_to {
            builder = builder.bind(assignee);
        }
        if let Some(asset_id) = asset_id {
            builder = builder.bind(asset_id);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        let now = Utc::now();

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let assignment = Assignment::from_row(&row)?;
            let asset = AssetSummary {
                id: assignment.asset_id,
                name: row.get("asset_name"),
                status: row.get("asset_status"),
                qr_code: row.get("asset_qr_code"),
            };
            result.push(AssignmentDetails::new(assignment, Some(asset), now));
        }

        Ok(result)
    }

    /// Active assignments past their expected return date
    pub async fn list_overdue(&self, org_id: &str) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE org_id = $1 AND status = 'Active'
              AND expected_return_at IS NOT NULL AND expected_return_at < NOW()
            ORDER BY expected_return_at
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count active assignments past their expected return date
    pub async fn count_overdue(&self, org_id: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM assignments
            WHERE org_id = $1 AND status = 'Active'
              AND expected_return_at IS NOT NULL AND expected_return_at < NOW()
            "#,
        )
        .bind(org_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
