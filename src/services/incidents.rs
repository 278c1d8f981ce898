//! Incident tracker service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::incident::{Incident, IncidentDetails, IncidentQuery, ReportIncident, UpdateIncident},
    repository::Repository,
};

#[derive(Clone)]
pub struct IncidentsService {
    repository: Repository,
}

impl IncidentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Report an incident against an asset
    pub async fn report(
        &self,
        org_id: &str,
        reporter_id: &str,
        data: &ReportIncident,
    ) -> AppResult<Incident> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.incidents.report(org_id, reporter_id, data).await
    }

    /// Get incident by ID
    pub async fn get(&self, org_id: &str, id: i32) -> AppResult<IncidentDetails> {
        self.repository.incidents.get_by_id(org_id, id).await
    }

    /// List incidents, newest first. Runs the automated lifecycle pass
    /// first so listings never show stale Resolved/Closed tickets.
    pub async fn list(&self, org_id: &str, query: &IncidentQuery) -> AppResult<Vec<IncidentDetails>> {
        self.repository.incidents.process_lifecycle(org_id).await?;
        self.repository.incidents.list(org_id, query).await
    }

    /// Update status, append notes, or archive
    pub async fn update(
        &self,
        org_id: &str,
        actor_id: &str,
        id: i32,
        data: &UpdateIncident,
    ) -> AppResult<Incident> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.incidents.update(org_id, actor_id, id, data).await
    }
}
