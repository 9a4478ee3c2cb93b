//! Local JSON collection files
//!
//! Each collection is one pretty-printed JSON file under the data
//! directory. Reads never fail the caller: an absent or corrupt file is
//! logged and replaced by the supplied default, so a damaged disk copy
//! degrades to an empty collection rather than a crash.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Local filesystem store for JSON documents.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Absolute path of a collection file.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Read and parse a collection file.
    ///
    /// Returns `Ok(None)` when the file does not exist; a present but
    /// unparseable file is an error for this strict variant.
    pub async fn load(&self, file_name: &str) -> Result<Option<Value>> {
        let path = self.path_for(file_name);
        if !path.exists() {
            return Ok(None);
        }
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Read a collection file, falling back to `default` when it is
    /// missing or cannot be parsed.
    pub async fn load_or(&self, file_name: &str, default: Value) -> Value {
        match self.load(file_name).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(file_name, "No local file, using default");
                default
            }
            Err(error) => {
                warn!(file_name, %error, "Unreadable local file, using default");
                default
            }
        }
    }

    /// Write a document as pretty-printed JSON, creating the data
    /// directory on first use.
    pub async fn save(&self, file_name: &str, value: &Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let text = serde_json::to_string_pretty(value)?;
        tokio::fs::write(self.path_for(file_name), text).await?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
