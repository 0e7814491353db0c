//! Cache-first services.
//!
//! `UserService` and `StatisticsService` serve each collection from the
//! store when it is populated and no refresh is forced; otherwise they fetch
//! a fresh snapshot, replace the stored collection, and return what was
//! fetched. `StatisticsService` also joins statistics with users into the
//! per-user aggregate (see [`aggregate`]).

pub mod aggregate;
pub mod statistics;
pub mod user;

#[cfg(test)]
pub(crate) mod fakes;

pub use aggregate::{aggregate, parse_view_date};
pub use statistics::StatisticsService;
pub use user::UserService;
