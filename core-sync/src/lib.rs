//! # Core Sync
//!
//! Coordinates the link between local record collections and the remote
//! root folder: resolving shareable links, persisting the linked folder
//! across restarts, and pulling remote state down into the local store.

pub mod coordinator;
pub mod error;

pub use coordinator::SyncCoordinator;
pub use error::{Result, SyncError};
