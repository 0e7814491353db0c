use thiserror::Error;

use crate::api::ApiError;
use crate::cache::StoreError;

/// Failure of a service-level load. Remote and store errors pass through unchanged.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
