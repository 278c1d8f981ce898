//! Redis service for the dashboard summary cache

use redis::{AsyncCommands, Client};

use crate::{
    api::dashboard::DashboardData,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    fn dashboard_key(org_id: &str) -> String {
        format!("dashboard:{}", org_id)
    }

    /// Get the cached dashboard summary for an organization
    pub async fn get_dashboard_cache(&self, org_id: &str) -> AppResult<Option<DashboardData>> {
        let mut conn = self.connection().await?;

        let raw: Option<String> = conn
            .get(Self::dashboard_key(org_id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read dashboard cache: {}", e)))?;

        match raw {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Corrupt dashboard cache entry: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Cache the dashboard summary for an organization with a TTL
    pub async fn set_dashboard_cache(
        &self,
        org_id: &str,
        data: &DashboardData,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let json = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize dashboard data: {}", e)))?;

        conn.set_ex::<_, _, ()>(Self::dashboard_key(org_id), json, ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write dashboard cache: {}", e)))?;

        Ok(())
    }

    /// Clear the cached dashboard summary when assignment data changes
    pub async fn invalidate_dashboard_cache(&self, org_id: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let _: () = conn
            .del(Self::dashboard_key(org_id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to invalidate dashboard cache: {}", e)))?;

        Ok(())
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}
