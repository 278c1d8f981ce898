//! Assignment ledger service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::assignment::{Assignment, AssignmentDetails, CheckoutRequest},
    repository::Repository,
};

use super::redis::RedisService;

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
    redis: RedisService,
}

impl AssignmentsService {
    pub fn new(repository: Repository, redis: RedisService) -> Self {
        Self { repository, redis }
    }

    /// Check an asset out to a member
    pub async fn checkout(
        &self,
        org_id: &str,
        admin_id: &str,
        request: &CheckoutRequest,
    ) -> AppResult<Assignment> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let assignment = self
            .repository
            .assignments
            .checkout(org_id, admin_id, request)
            .await?;

        self.invalidate_dashboard(org_id).await;
        Ok(assignment)
    }

    /// Check an asset back in
    pub async fn checkin(&self, org_id: &str, actor_id: &str, asset_id: i32) -> AppResult<Assignment> {
        let assignment = self
            .repository
            .assignments
            .checkin(org_id, actor_id, asset_id)
            .await?;

        self.invalidate_dashboard(org_id).await;
        Ok(assignment)
    }

    /// Active assignments; non-admin callers see only their own
    pub async fn list_active(
        &self,
        org_id: &str,
        assigned_to: Option<&str>,
    ) -> AppResult<Vec<AssignmentDetails>> {
        self.repository.assignments.list_active(org_id, assigned_to).await
    }

    /// Returned assignments, most recently returned first
    pub async fn list_history(
        &self,
        org_id: &str,
        assigned_to: Option<&str>,
    ) -> AppResult<Vec<AssignmentDetails>> {
        self.repository.assignments.list_history(org_id, assigned_to).await
    }

    /// Full history for one asset
    pub async fn history_for_asset(
        &self,
        org_id: &str,
        asset_id: i32,
    ) -> AppResult<Vec<AssignmentDetails>> {
        // Surface 404 for unknown assets rather than an empty history
        self.repository.assets.get_by_id(org_id, asset_id).await?;
        self.repository.assignments.history_for_asset(org_id, asset_id).await
    }

    /// Cache invalidation is best-effort: a stale dashboard is tolerable,
    /// a failed checkout is not.
    async fn invalidate_dashboard(&self, org_id: &str) {
        if let Err(e) = self.redis.invalidate_dashboard_cache(org_id).await {
            tracing::warn!("Dashboard cache invalidation failed for {}: {}", org_id, e);
        }
    }
}
