use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{PersistentStore, StatisticsRecord, StoreError};
use crate::models::StatisticsItem;

pub struct StatisticsRepository {
    store: Arc<PersistentStore>,
}

impl StatisticsRepository {
    pub fn new(store: Arc<PersistentStore>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> Result<Vec<StatisticsItem>, StoreError> {
        let records = self.store.fetch_all::<StatisticsRecord>()?;
        debug!(count = records.len(), "Loaded statistics from store");
        Ok(records.iter().map(StatisticsRecord::to_domain).collect())
    }

    /// Replace the stored statistics with `items` in one transaction.
    /// Items sharing a `user_id`/type key collapse to the last one.
    pub fn replace_all(&self, items: &[StatisticsItem]) -> Result<(), StoreError> {
        let records: Vec<StatisticsRecord> = items.iter().map(StatisticsRecord::from).collect();
        self.store.replace_all(records)
    }

    /// True if at least one item is stored. Store errors count as no cache.
    pub fn has_cache(&self) -> bool {
        match self.store.count::<StatisticsRecord>() {
            Ok(count) => count > 0,
            Err(e) => {
                warn!(error = %e, "Failed to check statistics cache, treating as empty");
                false
            }
        }
    }
}
