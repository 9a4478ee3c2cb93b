//! Drive API wire types
//!
//! Data structures for deserializing Drive API v3-style responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type the backend uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Drive API file resource
///
/// A read-only snapshot of backend-owned metadata. A file may have zero or
/// more parents; folders form a DAG, and the first entry is treated as the
/// primary parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Backend-assigned identifier, immutable once created
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// File size in bytes (omitted for folders; the API sends a string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,

    /// Parent folder IDs
    #[serde(default)]
    pub parents: Vec<String>,

    /// Whether file is trashed
    #[serde(default)]
    pub trashed: bool,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Size in bytes, if the backend reported one
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }

    /// Parsed modification timestamp
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One page of a folder listing
#[derive(Debug, Clone, PartialEq)]
pub struct FilePage {
    pub files: Vec<DriveFile>,
    /// Opaque continuation marker; `None` on the last page
    pub next_page_token: Option<String>,
}

/// Drive API files.list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    pub next_page_token: Option<String>,
}

impl From<FilesListResponse> for FilePage {
    fn from(response: FilesListResponse) -> Self {
        Self {
            files: response.files,
            next_page_token: response.next_page_token,
        }
    }
}

/// A node in a recursive sub-folder listing
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub children: Vec<FolderNode>,
}

/// Replace characters the local filesystem or the backend reject in names.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_drive_file() {
        let json = r#"{
            "id": "abc123",
            "name": "assignments.json",
            "mimeType": "application/json",
            "size": "2048",
            "modifiedTime": "2024-03-01T10:00:00.000Z",
            "parents": ["folder1"],
            "trashed": false
        }"#;

        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "abc123");
        assert_eq!(file.name, "assignments.json");
        assert_eq!(file.size_bytes(), Some(2048));
        assert!(!file.is_folder());
        assert!(file.modified_at().is_some());
    }

    #[test]
    fn test_deserialize_folder_with_sparse_fields() {
        let json = r#"{
            "id": "folder123",
            "name": "Mathematics",
            "mimeType": "application/vnd.google-apps.folder"
        }"#;

        let folder: DriveFile = serde_json::from_str(json).unwrap();
        assert!(folder.is_folder());
        assert_eq!(folder.size_bytes(), None);
        assert!(folder.parents.is_empty());
        assert!(!folder.trashed);
    }

    #[test]
    fn test_deserialize_files_list_response() {
        let json = r#"{
            "files": [
                {
                    "id": "file1",
                    "name": "students.json",
                    "mimeType": "application/json"
                }
            ],
            "nextPageToken": "token123"
        }"#;

        let page: FilePage = serde_json::from_str::<FilesListResponse>(json).unwrap().into();
        assert_eq!(page.files.len(), 1);
        assert_eq!(page.next_page_token, Some("token123".to_string()));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b:c?.pdf"), "a_b_c_.pdf");
        assert_eq!(sanitize_file_name("plain.txt"), "plain.txt");
    }
}
