//! Activity log service

use crate::{
    error::AppResult,
    models::activity::{ActivityLogEntry, ActivityQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct ActivityService {
    repository: Repository,
}

impl ActivityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List activity entries, newest first
    pub async fn list(&self, org_id: &str, query: &ActivityQuery) -> AppResult<Vec<ActivityLogEntry>> {
        self.repository.activity.list(org_id, query).await
    }
}
