//! Activity log repository

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::activity::{ActivityLogEntry, ActivityQuery, NewActivityEntry},
};

const DEFAULT_LIMIT: i64 = 50;

/// Append an entry inside the transaction of its triggering domain
/// mutation. A failed append fails the whole operation: the caller's
/// transaction rolls back, so no state transition is left without an
/// audit trail.
pub(crate) async fn append_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: NewActivityEntry,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs (org_id, asset_id, asset_name, actor_id, event_type, details)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&entry.org_id)
    .bind(entry.asset_id)
    .bind(&entry.asset_name)
    .bind(&entry.actor_id)
    .bind(entry.detail.event_type())
    .bind(entry.detail.to_json())
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::Inconsistency(format!("Activity log append failed: {}", e)))?;

    Ok(())
}

#[derive(Clone)]
pub struct ActivityRepository {
    pool: Pool<Postgres>,
}

impl ActivityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List activity entries, newest first
    pub async fn list(&self, org_id: &str, query: &ActivityQuery) -> AppResult<Vec<ActivityLogEntry>> {
        let mut conditions = vec!["org_id = $1".to_string()];
        let mut idx = 2;

        if query.asset_id.is_some() {
            conditions.push(format!("asset_id = ${}", idx));
            idx += 1;
        }
        if query.event_type.is_some() {
            conditions.push(format!("event_type = ${}", idx));
            idx += 1;
        }
        if query.search.is_some() {
            conditions.push(format!(
                "(asset_name ILIKE ${i} OR actor_id ILIKE ${i} OR event_type ILIKE ${i})",
                i = idx
            ));
            idx += 1;
        }

        let sql = format!(
            "SELECT * FROM activity_logs WHERE {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions.join(" AND "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, ActivityLogEntry>(&sql).bind(org_id);
        if let Some(asset_id) = query.asset_id {
            builder = builder.bind(asset_id);
        }
        if let Some(event_type) = query.event_type {
            builder = builder.bind(event_type);
        }
        if let Some(ref search) = query.search {
            builder = builder.bind(format!("%{}%", search));
        }

        let entries = builder
            .bind(query.limit.unwrap_or(DEFAULT_LIMIT))
            .bind(query.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Count checked_out entries per asset within a window, most first
    pub async fn top_checked_out(
        &self,
        org_id: &str,
        since: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> AppResult<Vec<(i32, String, i64)>> {
        let rows: Vec<(i32, String, i64)> = sqlx::query_as(
            r#"
            SELECT asset_id, MAX(asset_name) as asset_name, COUNT(*) as checkout_count
            FROM activity_logs
            WHERE org_id = $1 AND event_type = 'checked_out' AND created_at >= $2
            GROUP BY asset_id
            ORDER BY checkout_count DESC
            LIMIT $3
            "#,
        )
        .bind(org_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
