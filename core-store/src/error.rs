//! Store error types

use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote storage error: {0}")]
    Remote(#[from] provider_drive::DriveError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
