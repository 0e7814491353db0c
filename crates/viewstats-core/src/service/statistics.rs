use std::sync::Arc;

use tracing::{debug, info};

use crate::api::RemoteSource;
use crate::error::Result;
use crate::models::{StatisticsItem, UserStatistics};
use crate::repository::StatisticsRepository;

use super::aggregate::aggregate;
use super::UserService;

pub struct StatisticsService {
    remote: Arc<dyn RemoteSource>,
    repository: StatisticsRepository,
    users: Arc<UserService>,
}

impl StatisticsService {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        repository: StatisticsRepository,
        users: Arc<UserService>,
    ) -> Self {
        Self {
            remote,
            repository,
            users,
        }
    }

    /// Same cache-or-fetch rule as [`UserService::load_users`]
    pub async fn load_statistics(&self, force_refresh: bool) -> Result<Vec<StatisticsItem>> {
        if !force_refresh && self.repository.has_cache() {
            debug!("Serving statistics from cache");
            return Ok(self.repository.get_all()?);
        }

        debug!(force_refresh, "Fetching statistics from remote");
        let items = self.remote.fetch_statistics().await?;
        self.repository.replace_all(&items)?;
        info!(count = items.len(), force_refresh, "Statistics refreshed");
        Ok(items)
    }

    /// Load statistics and users concurrently with the same `force_refresh`,
    /// then join them into per-user summaries sorted by views.
    ///
    /// Fails as soon as either load fails; the other load is dropped.
    pub async fn load_aggregated_statistics(&self, force_refresh: bool) -> Result<Vec<UserStatistics>> {
        let (items, users) = tokio::try_join!(
            self.load_statistics(force_refresh),
            self.users.load_users(force_refresh),
        )?;

        let summaries = aggregate(&items, &users);
        debug!(
            items = items.len(),
            users = users.len(),
            summaries = summaries.len(),
            "Aggregated statistics"
        );
        Ok(summaries)
    }
}
