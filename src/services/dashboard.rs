//! Dashboard aggregation service
//!
//! Pure read-side rollups over assets, assignments, incidents and the
//! activity log. Snapshots are eventually consistent across the source
//! tables and cached per organization in Redis.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::Row;

use crate::{
    api::dashboard::{
        DashboardAsset, DashboardCounts, DashboardData, DashboardLists, HealthBreakdown,
        OverdueTrendPoint, TopAsset, ValueAtRisk,
    },
    error::AppResult,
    models::{assignment::Assignment, enums::AssetStatus},
    repository::Repository,
};

use super::redis::RedisService;

const DEFAULT_RANGE_DAYS: i64 = 30;
const TOP_ASSETS_LIMIT: i64 = 5;
const LIST_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    redis: RedisService,
    cache_ttl: u64,
}

impl DashboardService {
    pub fn new(repository: Repository, redis: RedisService, cache_ttl: u64) -> Self {
        Self {
            repository,
            redis,
            cache_ttl,
        }
    }

    /// Aggregated dashboard data for an organization. Cached; cache
    /// failures degrade to a recompute, never to an error.
    pub async fn summary(&self, org_id: &str, range: Option<&str>) -> AppResult<DashboardData> {
        match self.redis.get_dashboard_cache(org_id).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => tracing::warn!("Dashboard cache read failed for {}: {}", org_id, e),
        }

        let days = parse_range_days(range);
        let now = Utc::now();
        let range_start = now - Duration::days(days);
        let pool = &self.repository.pool;

        // Counts by asset status
        let status_counts: Vec<(AssetStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM assets WHERE org_id = $1 GROUP BY status")
                .bind(org_id)
                .fetch_all(pool)
                .await?;

        let count_for = |status: AssetStatus| -> i64 {
            status_counts
                .iter()
                .find(|(s, _)| *s == status)
                .map(|(_, c)| *c)
                .unwrap_or(0)
        };

        let total_assets: i64 = status_counts.iter().map(|(_, c)| c).sum();
        let checked_out = count_for(AssetStatus::CheckedOut);
        let repair = count_for(AssetStatus::Maintenance);
        // Retired assets are reported as missing on the dashboard
        let missing = count_for(AssetStatus::Retired);

        let overdue_assignments = self.repository.assignments.list_overdue(org_id).await?;
        let overdue = overdue_assignments.len() as i64;

        let counts = DashboardCounts {
            total_assets,
            checked_out,
            overdue,
            repair,
            missing,
        };

        let health_breakdown = HealthBreakdown {
            good: count_for(AssetStatus::Available) + checked_out,
            needs_attention: repair,
            out_of_service: missing,
        };

        // Overdue trend: one sample per day across the range
        let window: Vec<Assignment> = sqlx::query_as(
            r#"
            SELECT * FROM assignments
            WHERE org_id = $1 AND expected_return_at IS NOT NULL
              AND checked_out_at <= $2
              AND (actual_return_at IS NULL OR actual_return_at >= $3)
            "#,
        )
        .bind(org_id)
        .bind(now)
        .bind(range_start)
        .fetch_all(pool)
        .await?;

        let trend = overdue_trend(&window, now, days);

        // Top assets by checked_out activity entries within the range
        let top_assets: Vec<TopAsset> = self
            .repository
            .activity
            .top_checked_out(org_id, range_start, TOP_ASSETS_LIMIT)
            .await?
            .into_iter()
            .map(|(asset_id, name, checkout_count)| TopAsset {
                asset_id: asset_id.to_string(),
                name,
                checkout_count,
            })
            .collect();

        // Value at risk
        let overdue_asset_ids: Vec<i32> =
            overdue_assignments.iter().map(|a| a.asset_id).collect();
        let overdue_value: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(estimated_value), 0) FROM assets WHERE id = ANY($1)",
        )
        .bind(&overdue_asset_ids)
        .fetch_one(pool)
        .await?;

        let repair_value: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(estimated_value), 0) FROM assets WHERE org_id = $1 AND status = $2",
        )
        .bind(org_id)
        .bind(AssetStatus::Maintenance)
        .fetch_one(pool)
        .await?;

        let missing_value: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(estimated_value), 0) FROM assets WHERE org_id = $1 AND status = $2",
        )
        .bind(org_id)
        .bind(AssetStatus::Retired)
        .fetch_one(pool)
        .await?;

        let total_value = overdue_value + repair_value + missing_value;

        let value_at_risk = ValueAtRisk {
            overdue_value: decimal_to_f64(overdue_value),
            repair_value: decimal_to_f64(repair_value),
            missing_value: decimal_to_f64(missing_value),
            total_value: decimal_to_f64(total_value),
        };

        // Lists
        let overdue_rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.estimated_value, a.assigned_to, a.expected_return_at
            FROM assignments a
            JOIN assets s ON a.asset_id = s.id
            WHERE a.org_id = $1 AND a.status = 'Active'
              AND a.expected_return_at IS NOT NULL AND a.expected_return_at < NOW()
            ORDER BY a.expected_return_at
            LIMIT $2
            "#,
        )
        .bind(org_id)
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await?;

        let overdue_list = overdue_rows
            .into_iter()
            .map(|row| {
                let due: Option<DateTime<Utc>> = row.get("expected_return_at");
                DashboardAsset {
                    id: row.get::<i32, _>("id").to_string(),
                    name: row.get("name"),
                    status: AssetStatus::CheckedOut.to_string(),
                    assignee: Some(row.get("assigned_to")),
                    due_date: due.map(|d| d.format("%Y-%m-%d").to_string()),
                    value: row
                        .get::<Option<Decimal>, _>("estimated_value")
                        .map(decimal_to_f64),
                }
            })
            .collect();

        let repair_list = self
            .status_list(org_id, AssetStatus::Maintenance, "Maintenance")
            .await?;
        let missing_list = self
            .status_list(org_id, AssetStatus::Retired, "Missing")
            .await?;

        let insights = build_insights(overdue, value_at_risk.total_value, &top_assets);

        let data = DashboardData {
            counts,
            health_breakdown,
            overdue_trend: trend,
            top_assets,
            value_at_risk,
            lists: DashboardLists {
                overdue_assignments: overdue_list,
                repair_assets: repair_list,
                missing_assets: missing_list,
            },
            insights,
        };

        if let Err(e) = self
            .redis
            .set_dashboard_cache(org_id, &data, self.cache_ttl)
            .await
        {
            tracing::warn!("Dashboard cache write failed for {}: {}", org_id, e);
        }

        Ok(data)
    }

    async fn status_list(
        &self,
        org_id: &str,
        status: AssetStatus,
        label: &str,
    ) -> AppResult<Vec<DashboardAsset>> {
        let rows = sqlx::query(
            "SELECT id, name, estimated_value FROM assets WHERE org_id = $1 AND status = $2 LIMIT $3",
        )
        .bind(org_id)
        .bind(status)
        .bind(LIST_LIMIT)
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DashboardAsset {
                id: row.get::<i32, _>("id").to_string(),
                name: row.get("name"),
                status: label.to_string(),
                assignee: None,
                due_date: None,
                value: row
                    .get::<Option<Decimal>, _>("estimated_value")
                    .map(decimal_to_f64),
            })
            .collect())
    }
}

/// Parse a range query like "30d" into a day count
pub(crate) fn parse_range_days(range: Option<&str>) -> i64 {
    range
        .and_then(|r| r.strip_suffix('d'))
        .and_then(|days| days.parse::<i64>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_RANGE_DAYS)
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Whether an assignment was overdue at a given instant
fn overdue_at(assignment: &Assignment, at: DateTime<Utc>) -> bool {
    assignment.checked_out_at <= at
        && assignment
            .expected_return_at
            .map(|due| due < at)
            .unwrap_or(false)
        && assignment
            .actual_return_at
            .map(|returned| returned > at)
            .unwrap_or(true)
}

/// One overdue count per day across the trailing range; the final point
/// is labeled "Today".
pub(crate) fn overdue_trend(
    assignments: &[Assignment],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<OverdueTrendPoint> {
    (0..days)
        .rev()
        .map(|offset| {
            let sample = now - Duration::days(offset);
            let overdue_count = assignments
                .iter()
                .filter(|a| overdue_at(a, sample))
                .count() as i64;
            let date = if offset == 0 {
                "Today".to_string()
            } else {
                sample.format("%Y-%m-%d").to_string()
            };
            OverdueTrendPoint {
                date,
                overdue_count,
            }
        })
        .collect()
}

/// Free-text insight strings derived from the other dashboard fields
pub(crate) fn build_insights(
    overdue_count: i64,
    total_value_at_risk: f64,
    top_assets: &[TopAsset],
) -> Vec<String> {
    let mut insights = Vec::new();

    if overdue_count > 0 {
        let (plural, verb) = if overdue_count == 1 {
            ("", "is")
        } else {
            ("s", "are")
        };
        insights.push(format!(
            "{} item{} {} overdue today.",
            overdue_count, plural, verb
        ));
    }

    if total_value_at_risk > 0.0 {
        insights.push(format!(
            "${} worth of gear is currently unavailable (missing/repair/overdue).",
            format_thousands(total_value_at_risk)
        ));
    }

    if let Some(top) = top_assets.first() {
        insights.push(format!(
            "The most checked-out asset this month is {} ({} checkouts).",
            top.name, top.checkout_count
        ));
    }

    if insights.is_empty() {
        insights.push("All equipment is accounted for and operational. Great work!".to_string());
    }

    insights
}

/// Round to whole units and group with thousands separators
pub(crate) fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::AssignmentStatus;

    fn assignment(
        checked_out_days_ago: i64,
        due_days_ago: Option<i64>,
        returned_days_ago: Option<i64>,
        now: DateTime<Utc>,
    ) -> Assignment {
        Assignment {
            id: 1,
            org_id: "org_1".to_string(),
            asset_id: 7,
            assigned_to: "user_42".to_string(),
            assigned_by: "user_admin".to_string(),
            checked_out_at: now - Duration::days(checked_out_days_ago),
            expected_return_at: due_days_ago.map(|d| now - Duration::days(d)),
            actual_return_at: returned_days_ago.map(|d| now - Duration::days(d)),
            status: if returned_days_ago.is_some() {
                AssignmentStatus::Returned
            } else {
                AssignmentStatus::Active
            },
            notes: None,
            condition_photo_url: None,
            event_tags: None,
        }
    }

    #[test]
    fn test_parse_range_days() {
        assert_eq!(parse_range_days(Some("30d")), 30);
        assert_eq!(parse_range_days(Some("7d")), 7);
        assert_eq!(parse_range_days(None), 30);
        assert_eq!(parse_range_days(Some("bogus")), 30);
        assert_eq!(parse_range_days(Some("-5d")), 30);
    }

    #[test]
    fn test_trend_counts_overdue_only_after_due_date() {
        let now = Utc::now();
        // Checked out 10 days ago, due 4 days ago, still out
        let assignments = vec![assignment(10, Some(4), None, now)];
        let trend = overdue_trend(&assignments, now, 7);

        assert_eq!(trend.len(), 7);
        assert_eq!(trend.last().unwrap().date, "Today");
        // 6 days ago: not yet due
        assert_eq!(trend[0].overdue_count, 0);
        // Today: overdue
        assert_eq!(trend[6].overdue_count, 1);
    }

    #[test]
    fn test_trend_stops_counting_after_return() {
        let now = Utc::now();
        // Due 5 days ago, returned 2 days ago: overdue only in between
        let assignments = vec![assignment(10, Some(5), Some(2), now)];
        let trend = overdue_trend(&assignments, now, 7);

        // 4 days ago: due passed, not yet returned
        assert_eq!(trend[2].overdue_count, 1);
        // Today: already returned
        assert_eq!(trend[6].overdue_count, 0);
    }

    #[test]
    fn test_insights_singular_and_plural() {
        let one = build_insights(1, 0.0, &[]);
        assert_eq!(one[0], "1 item is overdue today.");

        let three = build_insights(3, 0.0, &[]);
        assert_eq!(three[0], "3 items are overdue today.");
    }

    #[test]
    fn test_insights_value_and_top_asset() {
        let top = vec![TopAsset {
            asset_id: "7".to_string(),
            name: "Canon R5 Kit".to_string(),
            checkout_count: 12,
        }];
        let insights = build_insights(0, 4950.0, &top);
        assert_eq!(
            insights[0],
            "$4,950 worth of gear is currently unavailable (missing/repair/overdue)."
        );
        assert_eq!(
            insights[1],
            "The most checked-out asset this month is Canon R5 Kit (12 checkouts)."
        );
    }

    #[test]
    fn test_insights_all_clear_fallback() {
        let insights = build_insights(0, 0.0, &[]);
        assert_eq!(
            insights,
            vec!["All equipment is accounted for and operational. Great work!"]
        );
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(4950.0), "4,950");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
    }
}
