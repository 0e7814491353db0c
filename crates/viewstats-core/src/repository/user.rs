use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{PersistentStore, StoreError, UserRecord};
use crate::models::User;

pub struct UserRepository {
    store: Arc<PersistentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<PersistentStore>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> Result<Vec<User>, StoreError> {
        let records = self.store.fetch_all::<UserRecord>()?;
        debug!(count = records.len(), "Loaded users from store");
        Ok(records.iter().map(UserRecord::to_domain).collect())
    }

    /// Replace the stored users with `users` in one transaction
    pub fn replace_all(&self, users: &[User]) -> Result<(), StoreError> {
        let records: Vec<UserRecord> = users.iter().map(UserRecord::from).collect();
        self.store.replace_all(records)
    }

    /// True if at least one user is stored. Store errors count as no cache.
    pub fn has_cache(&self) -> bool {
        match self.store.count::<UserRecord>() {
            Ok(count) => count > 0,
            Err(e) => {
                warn!(error = %e, "Failed to check user cache, treating as empty");
                false
            }
        }
    }
}
