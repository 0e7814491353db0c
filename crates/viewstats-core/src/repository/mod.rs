//! Repositories mapping domain models to stored records.
//!
//! Both repositories share one `PersistentStore` and expose the same three
//! operations: read everything, atomically replace everything, and report
//! whether a cached copy exists.

pub mod statistics;
pub mod user;

pub use statistics::StatisticsRepository;
pub use user::UserRepository;
