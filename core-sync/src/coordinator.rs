//! # Sync Coordinator
//!
//! Orchestrates the remote link for the record collections.
//!
//! ## Overview
//!
//! The `SyncCoordinator` sits between the host application and the
//! persistence layer:
//! - Resolve a shareable folder link and verify it points at a folder
//! - Persist the linked root folder id via `ConfigStore`
//! - Attach or detach the `DataManager`'s remote mirror
//! - Restore the persisted link at startup
//! - Pull all collections down from the remote on demand
//!
//! Pulls degrade rather than fail: a collection that cannot be fetched is
//! logged and skipped while the rest continue, and the result reports
//! whether the pass was clean.

use std::sync::Arc;

use core_runtime::ConfigStore;
use core_store::DataManager;
use provider_drive::{DriveClient, DriveFile};
use tracing::{info, instrument, warn};

use crate::error::{Result, SyncError};

/// Coordinator for linking and syncing the remote root folder.
pub struct SyncCoordinator {
    client: Option<Arc<DriveClient>>,
    config: ConfigStore,
    manager: Arc<DataManager>,
}

impl SyncCoordinator {
    /// `client` is `None` when the host runs without remote access; every
    /// remote-touching operation then reports `RemoteUnavailable` or acts
    /// as a local no-op.
    pub fn new(
        manager: Arc<DataManager>,
        config: ConfigStore,
        client: Option<Arc<DriveClient>>,
    ) -> Self {
        Self {
            client,
            config,
            manager,
        }
    }

    /// Re-attach the persisted root folder at startup.
    ///
    /// Returns `true` when a persisted link existed and was attached.
    #[instrument(skip(self))]
    pub async fn restore_link(&self) -> Result<bool> {
        let Some(client) = &self.client else {
            return Ok(false);
        };

        match self.config.root_folder_id().await? {
            Some(root_id) => {
                info!(%root_id, "Restoring persisted remote link");
                self.manager.link_remote(Arc::clone(client), root_id).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resolve a shareable link, verify it is a folder, persist it and
    /// attach the mirror.
    #[instrument(skip(self))]
    pub async fn link_root_folder(&self, link: &str) -> Result<DriveFile> {
        let client = self.client.as_ref().ok_or(SyncError::RemoteUnavailable)?;

        let (folder_id, metadata) = client.resolve_link(link).await?;
        if !metadata.is_folder() {
            warn!(%folder_id, name = %metadata.name, "Link resolves to a file, not a folder");
            return Err(SyncError::NotAFolder { file_id: folder_id });
        }

        self.config.set_root_folder_id(Some(&folder_id)).await?;
        self.manager
            .link_remote(Arc::clone(client), folder_id)
            .await;

        info!(name = %metadata.name, "Linked remote root folder");
        Ok(metadata)
    }

    /// Forget the linked folder and return to local-only operation.
    #[instrument(skip(self))]
    pub async fn unlink_root_folder(&self) -> Result<()> {
        self.config.set_root_folder_id(None).await?;
        self.manager.unlink_remote().await;
        Ok(())
    }

    pub async fn is_linked(&self) -> bool {
        self.manager.is_linked().await
    }

    /// Pull every collection from the remote, overwriting local copies.
    ///
    /// Returns `true` when at least one collection was refreshed from a
    /// remote copy; an unlinked manager or an empty remote root reports
    /// `false`. Per-collection failures are logged and skipped.
    #[instrument(skip(self))]
    pub async fn pull_all(&self) -> bool {
        let synced = self.manager.sync_from_remote().await;
        if synced {
            info!("Pulled collections from remote");
        } else {
            info!("Nothing pulled from remote");
        }
        synced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::json;
    use std::path::PathBuf;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(
                &self,
                request: HttpRequest,
            ) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: std::collections::HashMap::new(),
            body: Bytes::from(serde_json::to_vec(&body).unwrap()),
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("sync-test-{}", uuid::Uuid::new_v4()))
    }

    fn coordinator(dir: &PathBuf, client: Option<Arc<DriveClient>>) -> SyncCoordinator {
        SyncCoordinator::new(
            Arc::new(DataManager::new(dir.join("data"))),
            ConfigStore::new(dir.join("config.json")),
            client,
        )
    }

    #[tokio::test]
    async fn test_link_without_client_is_unavailable() {
        let dir = temp_dir();
        let coordinator = coordinator(&dir, None);

        let result = coordinator
            .link_root_folder("https://storage.example/folders/ABC123")
            .await;
        assert!(matches!(result, Err(SyncError::RemoteUnavailable)));
    }

    #[tokio::test]
    async fn test_restore_without_persisted_link_is_false() {
        let dir = temp_dir();
        let mock = MockHttp::new();
        let client = Arc::new(DriveClient::new(Arc::new(mock), "token"));
        let coordinator = coordinator(&dir, Some(client));

        assert!(!coordinator.restore_link().await.unwrap());
        assert!(!coordinator.is_linked().await);
    }

    #[tokio::test]
    async fn test_link_persists_and_attaches() {
        let dir = temp_dir();

        let mut mock = MockHttp::new();
        mock.expect_execute().times(1).returning(|_| {
            Ok(json_response(
                200,
                json!({
                    "id": "ABC123",
                    "name": "Class Records",
                    "mimeType": "application/vnd.google-apps.folder",
                }),
            ))
        });

        let client = Arc::new(DriveClient::new(Arc::new(mock), "token"));
        let coordinator = coordinator(&dir, Some(client));

        let folder = coordinator
            .link_root_folder("https://storage.example/folders/ABC123")
            .await
            .unwrap();

        assert_eq!(folder.name, "Class Records");
        assert!(coordinator.is_linked().await);
        assert_eq!(
            coordinator.config.root_folder_id().await.unwrap(),
            Some("ABC123".to_string())
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_link_rejects_plain_file() {
        let dir = temp_dir();

        let mut mock = MockHttp::new();
        mock.expect_execute().times(1).returning(|_| {
            Ok(json_response(
                200,
                json!({
                    "id": "FILE456789012345678901",
                    "name": "notes.txt",
                    "mimeType": "text/plain",
                }),
            ))
        });

        let client = Arc::new(DriveClient::new(Arc::new(mock), "token"));
        let coordinator = coordinator(&dir, Some(client));

        let result = coordinator
            .link_root_folder("https://storage.example/file/d/FILE456789012345678901/view")
            .await;

        assert!(matches!(result, Err(SyncError::NotAFolder { .. })));
        assert!(!coordinator.is_linked().await);
    }

    #[tokio::test]
    async fn test_unlink_clears_persisted_id() {
        let dir = temp_dir();

        let mut mock = MockHttp::new();
        mock.expect_execute().times(1).returning(|_| {
            Ok(json_response(
                200,
                json!({
                    "id": "ABC123",
                    "name": "Class Records",
                    "mimeType": "application/vnd.google-apps.folder",
                }),
            ))
        });

        let client = Arc::new(DriveClient::new(Arc::new(mock), "token"));
        let coordinator = coordinator(&dir, Some(client));

        coordinator
            .link_root_folder("https://storage.example/folders/ABC123")
            .await
            .unwrap();
        coordinator.unlink_root_folder().await.unwrap();

        assert!(!coordinator.is_linked().await);
        assert_eq!(coordinator.config.root_folder_id().await.unwrap(), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_restore_reattaches_persisted_link() {
        let dir = temp_dir();

        let config = ConfigStore::new(dir.join("config.json"));
        config.set_root_folder_id(Some("ABC123")).await.unwrap();

        let mock = MockHttp::new();
        let client = Arc::new(DriveClient::new(Arc::new(mock), "token"));
        let coordinator = coordinator(&dir, Some(client));

        assert!(coordinator.restore_link().await.unwrap());
        assert!(coordinator.is_linked().await);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_pull_all_without_link_reports_nothing_pulled() {
        let dir = temp_dir();
        let coordinator = coordinator(&dir, None);
        assert!(!coordinator.pull_all().await);
    }
}
