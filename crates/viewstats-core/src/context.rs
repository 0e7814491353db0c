use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{ApiClient, RemoteSource};
use crate::cache::PersistentStore;
use crate::config::Config;
use crate::repository::{StatisticsRepository, UserRepository};
use crate::service::{StatisticsService, UserService};

/// Wires one remote source and one store into the two services.
///
/// Both services share the same store; `StatisticsService` also holds the
/// `UserService` so aggregate loads go through the user cache.
pub struct StatsCore {
    store: Arc<PersistentStore>,
    users: Arc<UserService>,
    statistics: StatisticsService,
}

impl StatsCore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ApiClient::with_timeout(config.base_url.clone(), config.request_timeout())
            .context("Failed to create API client")?;
        let store = open_store(config.cache_dir());
        info!(base_url = %config.base_url, "Core initialized");

        Ok(Self::with_parts(Arc::new(client), Arc::new(store)))
    }

    pub fn with_parts(remote: Arc<dyn RemoteSource>, store: Arc<PersistentStore>) -> Self {
        let users = Arc::new(UserService::new(
            remote.clone(),
            UserRepository::new(store.clone()),
        ));
        let statistics =
            StatisticsService::new(remote, StatisticsRepository::new(store.clone()), users.clone());

        Self {
            store,
            users,
            statistics,
        }
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn statistics(&self) -> &StatisticsService {
        &self.statistics
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }
}

/// Open the store in `cache_dir`, or an unavailable one if there is no usable directory
fn open_store(cache_dir: Result<PathBuf>) -> PersistentStore {
    let store = match cache_dir {
        Ok(dir) => PersistentStore::open_or_unavailable(dir),
        Err(e) => {
            warn!(error = %e, "No cache directory");
            PersistentStore::unavailable()
        }
    };
    if !store.is_available() {
        warn!("Local store unavailable, running without cache");
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatisticsType;
    use crate::service::fakes::{item, user, FakeRemote};

    #[tokio::test]
    async fn test_services_share_store() {
        let remote = Arc::new(FakeRemote::new(
            vec![user(1, "alice")],
            vec![item(1, StatisticsType::View, vec![1092024])],
        ));
        let core = StatsCore::with_parts(remote.clone(), Arc::new(PersistentStore::in_memory()));

        core.users().load_users(false).await.expect("users");
        let summaries = core
            .statistics()
            .load_aggregated_statistics(false)
            .await
            .expect("aggregate");

        assert_eq!(remote.user_calls(), 1);
        assert_eq!(remote.statistics_calls(), 1);
        assert_eq!(summaries.len(), 1);
        assert_eq!(core.store().cache_ages().users_age(), "just now");
    }

    #[tokio::test]
    async fn test_new_opens_disk_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            cache_dir: Some(dir.path().join("cache")),
            ..Config::default()
        };
        let core = StatsCore::new(&config).expect("core");

        assert!(core.store().is_available());
        assert_eq!(core.store().dir(), Some(dir.path().join("cache").as_path()));
    }

    #[tokio::test]
    async fn test_invalid_base_url_surfaces_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            base_url: "ftp://example.com".to_string(),
            cache_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let core = StatsCore::new(&config).expect("core");

        let err = core.users().load_users(false).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::SyncError::Api(crate::api::ApiError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_missing_cache_dir_degrades_to_unavailable() {
        let store = open_store(Err(anyhow::anyhow!("Could not find cache directory")));
        assert!(!store.is_available());
        assert!(store.dir().is_none());
    }

    #[test]
    fn test_open_store_in_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(Ok(dir.path().to_path_buf()));
        assert!(store.is_available());
    }
}
