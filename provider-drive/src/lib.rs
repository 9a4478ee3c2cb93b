//! # Drive Storage Provider
//!
//! Client for a Google Drive-style remote file-storage API.
//!
//! ## Overview
//!
//! This crate provides the resilient access layer the LMS core persists
//! through:
//! - File and folder CRUD, paginated listing, name search and content I/O
//! - A per-client TTL cache for listing and metadata reads, with
//!   substring-pattern invalidation on every mutation
//! - Bounded retry with exponential backoff for transient failures
//!   (network errors, HTTP 429 and 5xx); terminal errors fail fast
//! - Resumable, progress-reporting uploads
//! - Shareable-link resolution to file ids

pub mod cache;
pub mod client;
pub mod error;
pub mod link;
pub mod query;
pub mod retry;
pub mod types;

pub use cache::TtlCache;
pub use client::DriveClient;
pub use error::{DriveError, Result};
pub use link::extract_file_id;
pub use query::Query;
pub use retry::RetryPolicy;
pub use types::{sanitize_file_name, DriveFile, FilePage, FolderNode, FOLDER_MIME_TYPE};
