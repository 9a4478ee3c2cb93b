//! Dual-backend persistence
//!
//! [`DualStore`] writes every collection to local disk first and then
//! mirrors it to the remote backend when one is linked. Reads prefer the
//! remote copy and fall back to local when the remote is unreachable, so
//! the application keeps working offline.
//!
//! [`RemoteMirror`] tracks which remote file id each collection file is
//! bound to. Bindings can go stale (the remote file deleted or replaced
//! out-of-band); a failed update clears the binding, re-uploads and
//! rebinds instead of failing the save.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use provider_drive::{DriveClient, DriveError};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::local::LocalStore;

/// Mirror of local collection files into one remote folder.
pub struct RemoteMirror {
    client: Arc<DriveClient>,
    root_id: String,
    bindings: Mutex<HashMap<String, String>>,
}

impl RemoteMirror {
    pub fn new(client: Arc<DriveClient>, root_id: impl Into<String>) -> Self {
        Self {
            client,
            root_id: root_id.into(),
            bindings: Mutex::new(HashMap::new()),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Bind `file_name` to a remote file id, adopting an existing remote
    /// file of that name if one exists.
    async fn resolve(&self, file_name: &str) -> Result<Option<String>> {
        if let Some(id) = self.bindings.lock().await.get(file_name).cloned() {
            return Ok(Some(id));
        }

        let found = self
            .client
            .find_by_name(file_name, &self.root_id, None)
            .await?
            .filter(|file| !file.is_folder());

        match found {
            Some(file) => {
                self.bindings
                    .lock()
                    .await
                    .insert(file_name.to_string(), file.id.clone());
                Ok(Some(file.id))
            }
            None => Ok(None),
        }
    }

    /// Download and parse the remote copy of a collection.
    ///
    /// `Ok(None)` when no remote copy exists. A binding pointing at a
    /// since-deleted file is cleared so the next call re-resolves.
    #[instrument(skip(self))]
    pub async fn pull(&self, file_name: &str) -> Result<Option<Value>> {
        let Some(file_id) = self.resolve(file_name).await? else {
            return Ok(None);
        };

        match self.client.download_content(&file_id).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(DriveError::FileNotFound { .. })
            | Err(DriveError::ApiError {
                status_code: 404, ..
            }) => {
                warn!(file_name, %file_id, "Remote copy vanished, clearing binding");
                self.bindings.lock().await.remove(file_name);
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Upload the local file at `local_path` as the remote copy of
    /// `file_name`, healing a stale binding if the bound file rejects the
    /// update.
    #[instrument(skip(self, local_path))]
    pub async fn push(&self, file_name: &str, local_path: &Path) -> Result<()> {
        let bound = self.bindings.lock().await.get(file_name).cloned();
        if let Some(file_id) = bound {
            match self.client.update(&file_id, local_path, None).await {
                Ok(_) => return Ok(()),
                Err(error) => {
                    warn!(file_name, %file_id, %error, "Bound remote file rejected update, rebinding");
                    self.bindings.lock().await.remove(file_name);
                }
            }
        }

        let existing = self
            .client
            .find_by_name(file_name, &self.root_id, None)
            .await?
            .filter(|file| !file.is_folder());

        match existing {
            Some(file) => {
                self.client.update(&file.id, local_path, None).await?;
                self.bindings
                    .lock()
                    .await
                    .insert(file_name.to_string(), file.id);
            }
            None => {
                let uploaded = self
                    .client
                    .upload(local_path, &self.root_id, Some(file_name), None)
                    .await?;
                info!(file_name, file_id = %uploaded.id, "Created remote copy");
                self.bindings
                    .lock()
                    .await
                    .insert(file_name.to_string(), uploaded.id);
            }
        }
        Ok(())
    }
}

/// Local-first store with an optional remote mirror.
pub struct DualStore {
    local: LocalStore,
    remote: RwLock<Option<RemoteMirror>>,
}

impl DualStore {
    pub fn new(local: LocalStore) -> Self {
        Self {
            local,
            remote: RwLock::new(None),
        }
    }

    pub fn with_remote(local: LocalStore, mirror: RemoteMirror) -> Self {
        Self {
            local,
            remote: RwLock::new(Some(mirror)),
        }
    }

    /// Attach or detach the remote mirror at runtime.
    pub async fn set_remote(&self, mirror: Option<RemoteMirror>) {
        *self.remote.write().await = mirror;
    }

    pub async fn has_remote(&self) -> bool {
        self.remote.read().await.is_some()
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Load a collection, preferring the remote copy.
    ///
    /// A successful remote read also refreshes the local copy. Remote
    /// failures and missing remote copies fall back to the local file,
    /// and a missing or corrupt local file falls back to `default`.
    pub async fn load(&self, file_name: &str, default: Value) -> Value {
        {
            let remote = self.remote.read().await;
            if let Some(mirror) = remote.as_ref() {
                match mirror.pull(file_name).await {
                    Ok(Some(value)) => {
                        if let Err(error) = self.local.save(file_name, &value).await {
                            warn!(file_name, %error, "Failed to refresh local copy from remote");
                        }
                        return value;
                    }
                    Ok(None) => debug!(file_name, "No remote copy, reading local"),
                    Err(error) => {
                        warn!(file_name, %error, "Remote read failed, falling back to local")
                    }
                }
            }
        }
        self.local.load_or(file_name, default).await
    }

    /// Save a collection locally, then mirror it.
    ///
    /// The local write is the source of truth: its failure is the
    /// caller's error, while a mirror failure is logged and absorbed.
    pub async fn save(&self, file_name: &str, value: &Value) -> Result<()> {
        self.local.save(file_name, value).await?;

        if let Some(mirror) = self.remote.read().await.as_ref() {
            if let Err(error) = mirror.push(file_name, &self.local.path_for(file_name)).await {
                warn!(file_name, %error, "Remote mirror failed, local copy is current");
            }
        }
        Ok(())
    }

    /// Overwrite the local copy from the remote one.
    ///
    /// Returns `true` when a remote copy existed and was written locally;
    /// `false` when no mirror is linked or no remote copy exists.
    pub async fn pull_from_remote(&self, file_name: &str) -> Result<bool> {
        let remote = self.remote.read().await;
        let Some(mirror) = remote.as_ref() else {
            return Ok(false);
        };

        match mirror.pull(file_name).await? {
            Some(value) => {
                self.local.save(file_name, &value).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
