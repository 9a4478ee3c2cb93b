//! Sync error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No remote client is configured")]
    RemoteUnavailable,

    #[error("Remote object {file_id} is not a folder")]
    NotAFolder { file_id: String },

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Remote storage error: {0}")]
    Remote(#[from] provider_drive::DriveError),

    #[error("Store error: {0}")]
    Store(#[from] core_store::StoreError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
