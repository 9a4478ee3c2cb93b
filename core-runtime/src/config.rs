//! # Persisted settings
//!
//! Application settings live in one JSON file. The only setting the data
//! core itself depends on is the linked remote root folder id; anything
//! else the host stores rides along in `extra` untouched.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ConfigStore;
//!
//! let store = ConfigStore::new("/path/to/config.json");
//! store.set_root_folder_id(Some("folder_abc")).await?;
//! assert_eq!(store.root_folder_id().await?, Some("folder_abc".to_string()));
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Persisted application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Remote root folder the record collections are mirrored into.
    /// `None` means no remote is linked and the store runs local-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder_id: Option<String>,

    /// Host-owned settings this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// JSON-file-backed settings store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings from disk. A missing file is an empty settings set;
    /// an unparseable file is logged and treated the same way.
    pub async fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(Settings::default());
        }

        let text = tokio::fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&text) {
            Ok(settings) => Ok(settings),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "Unreadable config file, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// Write settings to disk, creating the parent directory on first use.
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }

    pub async fn root_folder_id(&self) -> Result<Option<String>> {
        Ok(self.load().await?.root_folder_id)
    }

    /// Persist the linked root folder id; `None` unlinks it.
    pub async fn set_root_folder_id(&self, folder_id: Option<&str>) -> Result<()> {
        let mut settings = self.load().await?;
        settings.root_folder_id = folder_id.map(str::to_string);
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_config() -> (ConfigStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("config-test-{}", uuid::Uuid::new_v4()));
        (ConfigStore::new(dir.join("config.json")), dir)
    }

    #[tokio::test]
    async fn test_missing_file_loads_defaults() {
        let (store, _dir) = temp_config();
        let settings = store.load().await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_root_folder_link_and_unlink() {
        let (store, dir) = temp_config();

        store.set_root_folder_id(Some("folder_abc")).await.unwrap();
        assert_eq!(
            store.root_folder_id().await.unwrap(),
            Some("folder_abc".to_string())
        );

        store.set_root_folder_id(None).await.unwrap();
        assert_eq!(store.root_folder_id().await.unwrap(), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_unknown_settings_survive_round_trip() {
        let (store, dir) = temp_config();

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            store.path(),
            serde_json::to_string(&json!({"theme": "dark", "root_folder_id": "f1"})).unwrap(),
        )
        .unwrap();

        store.set_root_folder_id(Some("f2")).await.unwrap();

        let settings = store.load().await.unwrap();
        assert_eq!(settings.root_folder_id, Some("f2".to_string()));
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_defaults() {
        let (store, dir) = temp_config();

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(store.path(), "{broken").unwrap();

        assert_eq!(store.load().await.unwrap(), Settings::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
