//! Domain models for users and behavioral statistics.
//!
//! - `User`, `UserFile`, `Sex`: people as delivered by the remote users endpoint
//! - `StatisticsItem`, `StatisticsType`: per-user event date lists
//! - `UserStatistics`: the derived per-user aggregate, never persisted

pub mod statistics;
pub mod user;

pub use statistics::{StatisticsItem, StatisticsResponse, StatisticsType, UserStatistics};
pub use user::{Sex, User, UserFile, UsersResponse, AVATAR_FILE_TYPE};
