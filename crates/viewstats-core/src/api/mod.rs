//! Remote HTTP client module for the episode statistics API.
//!
//! This module provides the `ApiClient` for fetching the two remote
//! collections (users and statistics) and the `RemoteSource` trait that
//! services depend on, so tests can swap in a fake.
//!
//! Every fetch is a single GET with no internal retries.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{StatisticsItem, User};

pub use client::{ApiClient, Endpoint, DEFAULT_BASE_URL};
pub use error::ApiError;

/// Source of fresh snapshots for both collections.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError>;

    async fn fetch_statistics(&self) -> Result<Vec<StatisticsItem>, ApiError>;
}
