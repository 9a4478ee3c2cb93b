//! Error types for the Drive storage provider

use thiserror::Error;

/// Drive provider errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// API request returned an error status
    #[error("Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// File not found
    #[error("File not found: {file_id}")]
    FileNotFound { file_id: String },

    /// A shareable link or bare token could not be resolved to a file id
    #[error("Could not extract a file id from link: {0}")]
    InvalidLink(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Upload session failed; resumable sessions are not blindly retried
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Local file I/O while staging an upload or download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

impl DriveError {
    /// Whether the failure is worth retrying with backoff.
    ///
    /// Rate limiting (429), server errors (5xx) and transport failures are
    /// transient; 4xx statuses, parse failures and upload errors are
    /// terminal and fail fast.
    pub fn is_transient(&self) -> bool {
        match self {
            DriveError::ApiError { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            DriveError::Bridge(bridge_traits::error::BridgeError::Network(_)) => true,
            DriveError::Bridge(bridge_traits::error::BridgeError::Timeout(_)) => true,
            _ => false,
        }
    }
}

/// Result type for Drive operations
pub type Result<T> = std::result::Result<T, DriveError>;
