//! Core library for viewstats.
//!
//! Fetches users and their event statistics from the remote API, keeps a
//! local copy of both collections for offline use, and joins them into
//! per-user view summaries and a dashboard report. `StatsCore` is the entry
//! point that wires the pieces together.

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod repository;
pub mod report;
pub mod service;

pub use api::{ApiClient, ApiError, RemoteSource};
pub use cache::{CacheAges, PersistentStore, StoreError};
pub use config::Config;
pub use context::StatsCore;
pub use error::{Result, SyncError};
pub use models::{Sex, StatisticsItem, StatisticsType, User, UserStatistics};
pub use report::DashboardReport;
pub use service::{StatisticsService, UserService};
