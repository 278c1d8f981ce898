//! Business logic services

pub mod activity;
pub mod assets;
pub mod assignments;
pub mod dashboard;
pub mod incidents;
pub mod redis;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub assets: assets::AssetsService,
    pub assignments: assignments::AssignmentsService,
    pub incidents: incidents::IncidentsService,
    pub activity: activity::ActivityService,
    pub dashboard: dashboard::DashboardService,
    pub redis: redis::RedisService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        redis_service: redis::RedisService,
        dashboard_cache_ttl: u64,
    ) -> Self {
        Self {
            assets: assets::AssetsService::new(repository.clone()),
            assignments: assignments::AssignmentsService::new(
                repository.clone(),
                redis_service.clone(),
            ),
            incidents: incidents::IncidentsService::new(repository.clone()),
            activity: activity::ActivityService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(
                repository,
                redis_service.clone(),
                dashboard_cache_ttl,
            ),
            redis: redis_service,
        }
    }
}
