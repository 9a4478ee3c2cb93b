//! # Core Store
//!
//! Persistence layer for LMS record collections.
//!
//! Records live as JSON arrays on local disk and, when a remote root folder
//! is linked, are mirrored to the remote storage backend. The local copy is
//! authoritative for writes; remote failures degrade to local-only
//! operation instead of surfacing to callers.

pub mod document;
pub mod dual;
pub mod error;
pub mod local;
pub mod manager;

pub use document::ensure_ids;
pub use dual::{DualStore, RemoteMirror};
pub use error::{Result, StoreError};
pub use local::LocalStore;
pub use manager::{DataManager, ASSIGNMENTS_FILE, STUDENTS_FILE, SUBMISSIONS_FILE};
