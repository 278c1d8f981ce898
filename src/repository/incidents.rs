//! Incidents repository for database operations

use chrono::{Duration, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{ActivityDetail, NewActivityEntry, SYSTEM_ACTOR},
        asset::{Asset, AssetSummary},
        enums::{AssetStatus, IncidentStatus},
        incident::{Incident, IncidentDetails, IncidentNote, IncidentQuery, ReportIncident, UpdateIncident},
    },
};

use super::activity;

/// Resolved incidents auto-close after this many days
const AUTO_CLOSE_AFTER_DAYS: i64 = 7;
/// Closed incidents auto-archive after this many days
const AUTO_ARCHIVE_AFTER_DAYS: i64 = 2;

#[derive(Clone)]
pub struct IncidentsRepository {
    pool: Pool<Postgres>,
}

impl IncidentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Report an incident. High/Critical severity forces the asset into
    /// Maintenance (unless it is already there, or Retired) without
    /// touching any active assignment.
    pub async fn report(
        &self,
        org_id: &str,
        reporter_id: &str,
        data: &ReportIncident,
    ) -> AppResult<Incident> {
        let mut tx = self.pool.begin().await?;

        let asset = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(data.asset_id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", data.asset_id)))?;

        let incident = sqlx::query_as::<_, Incident>(
            r#"
            INSERT INTO incidents
                (org_id, asset_id, reported_by, title, description, severity, status, notes, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(data.asset_id)
        .bind(reporter_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.severity)
        .bind(IncidentStatus::Open)
        .bind(Json(Vec::<IncidentNote>::new()))
        .bind(&data.photo_url)
        .fetch_one(&mut *tx)
        .await?;

        let needs_override = data.severity.triggers_maintenance()
            && matches!(
                asset.status,
                AssetStatus::Available | AssetStatus::CheckedOut
            );

        if needs_override {
            sqlx::query("UPDATE assets SET status = $1 WHERE id = $2")
                .bind(AssetStatus::Maintenance)
                .bind(asset.id)
                .execute(&mut *tx)
                .await?;

            activity::append_in_tx(
                &mut tx,
                NewActivityEntry {
                    org_id: org_id.to_string(),
                    asset_id: asset.id,
                    asset_name: asset.name.clone(),
                    actor_id: SYSTEM_ACTOR.to_string(),
                    detail: ActivityDetail::Updated {
                        previous_status: asset.status,
                        new_status: AssetStatus::Maintenance,
                        updates: vec!["status".to_string()],
                        reason: Some(format!(
                            "Incident #{} reported with {} severity",
                            incident.id, data.severity
                        )),
                    },
                },
            )
            .await?;
        }

        activity::append_in_tx(
            &mut tx,
            NewActivityEntry {
                org_id: org_id.to_string(),
                asset_id: asset.id,
                asset_name: asset.name.clone(),
                actor_id: reporter_id.to_string(),
                detail: ActivityDetail::IncidentReported {
                    incident_id: incident.id,
                    title: incident.title.clone(),
                    severity: incident.severity,
                },
            },
        )
        .await?;

        tx.commit().await?;
        Ok(incident)
    }

    /// Get incident by ID with its asset summary
    pub async fn get_by_id(&self, org_id: &str, id: i32) -> AppResult<IncidentDetails> {
        let row = sqlx::query(
            r#"
            SELECT i.*, s.name AS asset_name, s.status AS asset_status, s.qr_code AS asset_qr_code
            FROM incidents i
            JOIN assets s ON i.asset_id = s.id
            WHERE i.id = $1 AND i.org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Incident with id {} not found", id)))?;

        Self::details_from_row(row)
    }

    /// List incidents, newest first
    pub async fn list(&self, org_id: &str, query: &IncidentQuery) -> AppResult<Vec<IncidentDetails>> {
        let mut conditions = vec!["i.org_id = $1".to_string()];
        let mut idx = 2;

        if !query.include_archived {
            conditions.push("i.is_archived = FALSE".to_string());
        }
        if query.status.is_some() {
            conditions.push(format!("i.status = ${}", idx));
            idx += 1;
        }
        if query.severity.is_some() {
            conditions.push(format!("i.severity = ${}", idx));
        }

        let sql = format!(
            r#"
            SELECT i.*, s.name AS asset_name, s.status AS asset_status, s.qr_code AS asset_qr_code
            FROM incidents i
            JOIN assets s ON i.asset_id = s.id
            WHERE {}
            ORDER BY i.created_at DESC
            "#,
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query(&sql).bind(org_id);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        if let Some(severity) = query.severity {
            builder = builder.bind(severity);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::details_from_row).collect()
    }

    /// Update an incident: append notes, change status, archive. Returns
    /// the current state without writing anything when nothing changes.
    pub async fn update(
        &self,
        org_id: &str,
        actor_id: &str,
        id: i32,
        data: &UpdateIncident,
    ) -> AppResult<Incident> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Incident>(
            "SELECT * FROM incidents WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Incident with id {} not found", id)))?;

        let status_change = data.status.filter(|s| *s != current.status);
        let archive_change = data.is_archived.filter(|a| *a != current.is_archived);
        let new_notes = data.notes.as_deref().unwrap_or(&[]);

        if status_change.is_none() && archive_change.is_none() && new_notes.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let now = Utc::now();
        let mut notes = current.notes.0.clone();
        for note in new_notes {
            notes.push(IncidentNote {
                text: note.text.clone(),
                actor_id: actor_id.to_string(),
                created_at: now,
            });
        }

        let incident = sqlx::query_as::<_, Incident>(
            r#"
            UPDATE incidents
            SET status = $1, notes = $2, is_archived = $3, updated_at = $4
            WHERE id = $5 AND org_id = $6
            RETURNING *
            "#,
        )
        .bind(status_change.unwrap_or(current.status))
        .bind(Json(notes))
        .bind(archive_change.unwrap_or(current.is_archived))
        .bind(now)
        .bind(id)
        .bind(org_id)
        .fetch_one(&mut *tx)
        .await?;

        let asset_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM assets WHERE id = $1")
                .bind(incident.asset_id)
                .fetch_optional(&mut *tx)
                .await?;
        let asset_name =
            asset_name.unwrap_or_else(|| format!("Asset #{}", incident.asset_id));

        if let Some(new_status) = status_change {
            activity::append_in_tx(
                &mut tx,
                NewActivityEntry {
                    org_id: org_id.to_string(),
                    asset_id: incident.asset_id,
                    asset_name,
                    actor_id: actor_id.to_string(),
                    detail: ActivityDetail::IncidentUpdated {
                        incident_id: incident.id,
                        previous_status: current.status,
                        new_status,
                        reason: None,
                    },
                },
            )
            .await?;
        } else if archive_change.is_some() {
            activity::append_in_tx(
                &mut tx,
                NewActivityEntry {
                    org_id: org_id.to_string(),
                    asset_id: incident.asset_id,
                    asset_name,
                    actor_id: actor_id.to_string(),
                    detail: ActivityDetail::IncidentUpdated {
                        incident_id: incident.id,
                        previous_status: current.status,
                        new_status: incident.status,
                        reason: Some("Incident archived".to_string()),
                    },
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(incident)
    }

    /// Automated lifecycle transitions, run before listing:
    /// Resolved > 7 days -> Closed, Closed > 2 days -> archived.
    pub async fn process_lifecycle(&self, org_id: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let close_threshold = now - Duration::days(AUTO_CLOSE_AFTER_DAYS);
        let to_close = sqlx::query(
            r#"
            SELECT i.id, i.asset_id, s.name AS asset_name
            FROM incidents i
            JOIN assets s ON i.asset_id = s.id
            WHERE i.org_id = $1 AND i.status = 'Resolved'
              AND i.updated_at <= $2 AND i.is_archived = FALSE
            FOR UPDATE OF i
            "#,
        )
        .bind(org_id)
        .bind(close_threshold)
        .fetch_all(&mut *tx)
        .await?;

        for row in &to_close {
            let incident_id: i32 = row.get("id");
            sqlx::query("UPDATE incidents SET status = 'Closed', updated_at = $1 WHERE id = $2")
                .bind(now)
                .bind(incident_id)
                .execute(&mut *tx)
                .await?;

            activity::append_in_tx(
                &mut tx,
                NewActivityEntry {
                    org_id: org_id.to_string(),
                    asset_id: row.get("asset_id"),
                    asset_name: row.get("asset_name"),
                    actor_id: SYSTEM_ACTOR.to_string(),
                    detail: ActivityDetail::IncidentUpdated {
                        incident_id,
                        previous_status: IncidentStatus::Resolved,
                        new_status: IncidentStatus::Closed,
                        reason: Some(format!(
                            "Automated lifecycle: Resolved for > {} days",
                            AUTO_CLOSE_AFTER_DAYS
                        )),
                    },
                },
            )
            .await?;
        }

        let archive_threshold = now - Duration::days(AUTO_ARCHIVE_AFTER_DAYS);
        let to_archive = sqlx::query(
            r#"
            SELECT i.id, i.asset_id, s.name AS asset_name
            FROM incidents i
            JOIN assets s ON i.asset_id = s.id
            WHERE i.org_id = $1 AND i.status = 'Closed'
              AND i.updated_at <= $2 AND i.is_archived = FALSE
            FOR UPDATE OF i
            "#,
        )
        .bind(org_id)
        .bind(archive_threshold)
        .fetch_all(&mut *tx)
        .await?;

        for row in &to_archive {
            let incident_id: i32 = row.get("id");
            sqlx::query("UPDATE incidents SET is_archived = TRUE, updated_at = $1 WHERE id = $2")
                .bind(now)
                .bind(incident_id)
                .execute(&mut *tx)
                .await?;

            activity::append_in_tx(
                &mut tx,
                NewActivityEntry {
                    org_id: org_id.to_string(),
                    asset_id: row.get("asset_id"),
                    asset_name: row.get("asset_name"),
                    actor_id: SYSTEM_ACTOR.to_string(),
                    detail: ActivityDetail::IncidentUpdated {
                        incident_id,
                        previous_status: IncidentStatus::Closed,
                        new_status: IncidentStatus::Closed,
                        reason: Some(format!(
                            "Automated lifecycle: Closed for > {} days",
                            AUTO_ARCHIVE_AFTER_DAYS
                        )),
                    },
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    fn details_from_row(row: sqlx::postgres::PgRow) -> AppResult<IncidentDetails> {
        let incident = Incident::from_row(&row)?;
        let asset = AssetSummary {
            id: incident.asset_id,
            name: row.get("asset_name"),
            status: row.get("asset_status"),
            qr_code: row.get("asset_qr_code"),
        };
        Ok(IncidentDetails {
            incident,
            asset: Some(asset),
        })
    }
}
