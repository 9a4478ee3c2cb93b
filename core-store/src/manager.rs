//! Collection manager
//!
//! Owns the three LMS record collections (assignments, students,
//! submissions) on top of [`DualStore`]. Collections are JSON arrays of
//! record objects; loading repairs records that lack ids and writes the
//! repaired collection back.

use std::path::PathBuf;
use std::sync::Arc;

use provider_drive::DriveClient;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::document;
use crate::dual::{DualStore, RemoteMirror};
use crate::error::Result;
use crate::local::LocalStore;

pub const ASSIGNMENTS_FILE: &str = "assignments.json";
pub const STUDENTS_FILE: &str = "students.json";
pub const SUBMISSIONS_FILE: &str = "submissions.json";

const ALL_COLLECTIONS: [&str; 3] = [ASSIGNMENTS_FILE, STUDENTS_FILE, SUBMISSIONS_FILE];

/// Manager for the LMS record collections.
pub struct DataManager {
    store: DualStore,
}

impl DataManager {
    /// Local-only manager rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: DualStore::new(LocalStore::new(data_dir)),
        }
    }

    /// Manager mirroring into the remote folder `root_id`.
    pub fn with_remote(
        data_dir: impl Into<PathBuf>,
        client: Arc<DriveClient>,
        root_id: impl Into<String>,
    ) -> Self {
        Self {
            store: DualStore::with_remote(
                LocalStore::new(data_dir),
                RemoteMirror::new(client, root_id),
            ),
        }
    }

    /// Attach a remote mirror, replacing any existing one.
    pub async fn link_remote(&self, client: Arc<DriveClient>, root_id: impl Into<String>) {
        let root_id = root_id.into();
        info!(%root_id, "Linking remote root folder");
        self.store
            .set_remote(Some(RemoteMirror::new(client, root_id)))
            .await;
    }

    /// Detach the remote mirror; subsequent operations are local-only.
    pub async fn unlink_remote(&self) {
        info!("Unlinking remote root folder");
        self.store.set_remote(None).await;
    }

    pub async fn is_linked(&self) -> bool {
        self.store.has_remote().await
    }

    pub async fn load_assignments(&self) -> Vec<Value> {
        self.load_collection(ASSIGNMENTS_FILE).await
    }

    pub async fn save_assignments(&self, records: &[Value]) -> Result<()> {
        self.save_collection(ASSIGNMENTS_FILE, records).await
    }

    pub async fn load_students(&self) -> Vec<Value> {
        self.load_collection(STUDENTS_FILE).await
    }

    pub async fn save_students(&self, records: &[Value]) -> Result<()> {
        self.save_collection(STUDENTS_FILE, records).await
    }

    pub async fn load_submissions(&self) -> Vec<Value> {
        self.load_collection(SUBMISSIONS_FILE).await
    }

    pub async fn save_submissions(&self, records: &[Value]) -> Result<()> {
        self.save_collection(SUBMISSIONS_FILE, records).await
    }

    /// Pull every collection from the remote, overwriting local copies.
    ///
    /// Returns `true` when at least one collection was actually refreshed
    /// from a remote copy. No mirror, an empty remote root, or failures
    /// on every collection all report `false`; individual failures are
    /// logged and do not stop the remaining collections.
    #[instrument(skip(self))]
    pub async fn sync_from_remote(&self) -> bool {
        let mut synced = false;
        for file_name in ALL_COLLECTIONS {
            match self.store.pull_from_remote(file_name).await {
                Ok(true) => {
                    info!(file_name, "Pulled collection from remote");
                    synced = true;
                }
                Ok(false) => {}
                Err(error) => warn!(file_name, %error, "Failed to pull collection"),
            }
        }
        synced
    }

    async fn load_collection(&self, file_name: &str) -> Vec<Value> {
        let loaded = self.store.load(file_name, Value::Array(Vec::new())).await;
        let mut records = match loaded {
            Value::Array(records) => records,
            other => {
                warn!(file_name, ?other, "Collection is not an array, resetting");
                Vec::new()
            }
        };

        if document::ensure_ids(&mut records) {
            info!(file_name, "Repaired records without ids");
            if let Err(error) = self
                .store
                .save(file_name, &Value::Array(records.clone()))
                .await
            {
                warn!(file_name, %error, "Failed to persist repaired ids");
            }
        }
        records
    }

    async fn save_collection(&self, file_name: &str, records: &[Value]) -> Result<()> {
        self.store
            .save(file_name, &Value::Array(records.to_vec()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_manager() -> (DataManager, PathBuf) {
        let dir = std::env::temp_dir().join(format!("manager-test-{}", uuid::Uuid::new_v4()));
        (DataManager::new(&dir), dir)
    }

    #[tokio::test]
    async fn test_collections_round_trip() {
        let (manager, dir) = temp_manager();

        manager
            .save_students(&[json!({"id": "s1", "name": "Ada"})])
            .await
            .unwrap();
        let students = manager.load_students().await;

        assert_eq!(students.len(), 1);
        assert_eq!(students[0]["name"], "Ada");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_collection_is_empty() {
        let (manager, _dir) = temp_manager();
        assert!(manager.load_submissions().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_repairs_missing_ids_and_persists() {
        let (manager, dir) = temp_manager();

        // Simulate a legacy export with id-less records.
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(ASSIGNMENTS_FILE),
            serde_json::to_string(&json!([{"title": "Essay"}, {"title": "Quiz"}])).unwrap(),
        )
        .unwrap();

        let assignments = manager.load_assignments().await;
        assert!(assignments.iter().all(|a| a["id"].is_string()));

        // The repaired ids were written back.
        let on_disk: Vec<Value> = serde_json::from_str(
            &std::fs::read_to_string(dir.join(ASSIGNMENTS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(on_disk, assignments);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_non_array_collection_resets_to_empty() {
        let (manager, dir) = temp_manager();

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(STUDENTS_FILE), "{\"oops\": true}").unwrap();

        assert!(manager.load_students().await.is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_sync_without_remote_reports_nothing_pulled() {
        let (manager, _dir) = temp_manager();
        assert!(!manager.is_linked().await);
        assert!(!manager.sync_from_remote().await);
    }

    #[tokio::test]
    async fn test_sync_reports_true_only_when_a_collection_was_refreshed() {
        use async_trait::async_trait;
        use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
        use bytes::Bytes;
        use mockall::mock;
        use provider_drive::{DriveClient, RetryPolicy};
        use std::time::Duration;

        mock! {
            Http {}

            #[async_trait]
            impl HttpClient for Http {
                async fn execute(
                    &self,
                    request: bridge_traits::http::HttpRequest,
                ) -> bridge_traits::error::Result<bridge_traits::http::HttpResponse>;
            }
        }

        fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
            HttpResponse {
                status,
                headers: std::collections::HashMap::new(),
                body: Bytes::from(serde_json::to_vec(&body).unwrap()),
            }
        }

        // Only assignments has a remote copy; the other collections are
        // absent. One refreshed collection must flip the result to true.
        let mut mock = MockHttp::new();
        mock.expect_execute().returning(|req| {
            if req.url.contains("alt=media") {
                Ok(HttpResponse {
                    status: 200,
                    headers: std::collections::HashMap::new(),
                    body: Bytes::from("[{\"id\": \"a1\"}]"),
                })
            } else if req.url.contains("assignments.json") {
                Ok(json_response(
                    200,
                    json!({"files": [{
                        "id": "r1",
                        "name": "assignments.json",
                        "mimeType": "application/json",
                        "trashed": false,
                    }]}),
                ))
            } else {
                Ok(json_response(200, json!({"files": []})))
            }
        });

        let client = Arc::new(DriveClient::with_policy(
            Arc::new(mock),
            "test_token",
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
            },
            Duration::from_secs(300),
        ));

        let dir = std::env::temp_dir().join(format!("manager-test-{}", uuid::Uuid::new_v4()));
        let manager = DataManager::with_remote(&dir, client, "root");

        assert!(manager.sync_from_remote().await);
        let assignments = manager.load_assignments().await;
        assert_eq!(assignments[0]["id"], "a1");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
