use std::sync::Arc;

use tracing::{debug, info};

use crate::api::RemoteSource;
use crate::error::Result;
use crate::models::User;
use crate::repository::UserRepository;

pub struct UserService {
    remote: Arc<dyn RemoteSource>,
    repository: UserRepository,
}

impl UserService {
    pub fn new(remote: Arc<dyn RemoteSource>, repository: UserRepository) -> Self {
        Self { remote, repository }
    }

    /// Cached users unless `force_refresh` is set or nothing is cached;
    /// otherwise the freshly fetched users, after they replace the cache.
    pub async fn load_users(&self, force_refresh: bool) -> Result<Vec<User>> {
        if !force_refresh && self.repository.has_cache() {
            debug!("Serving users from cache");
            return Ok(self.repository.get_all()?);
        }

        debug!(force_refresh, "Fetching users from remote");
        let users = self.remote.fetch_users().await?;
        self.repository.replace_all(&users)?;
        info!(count = users.len(), force_refresh, "Users refreshed");
        Ok(users)
    }

    /// Look up one user, loading from cache when possible
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let users = self.load_users(false).await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }
}
