//! Drive API client
//!
//! Wraps the remote file-storage API with caching, bounded retry and cache
//! invalidation on mutation. All wire traffic goes through the
//! [`HttpClient`] seam; retry policy and the TTL cache are held as plain
//! fields so each concern stays independently testable.
//!
//! Cache keys are derived from operation + parameters
//! (`files_{folder}_{page_size}_{token}`, `fileinfo_{id}`,
//! `search_{text}_{folder}`), which lets a mutation drop every cached read
//! touching a folder or file with one substring invalidation.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::cache::TtlCache;
use crate::error::{DriveError, Result};
use crate::link;
use crate::query::Query;
use crate::retry::RetryPolicy;
use crate::types::{
    sanitize_file_name, DriveFile, FilePage, FilesListResponse, FolderNode, FOLDER_MIME_TYPE,
};

/// Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload endpoint base URL (resumable sessions and media updates)
const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,parents,trashed";

/// Default listing order: folders first, then by name
const DEFAULT_ORDER: &str = "folder,name";

/// Default page size for folder listings
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Page size for name searches
const SEARCH_PAGE_SIZE: u32 = 50;

/// Resumable upload chunk size (a multiple of the API's 256 KiB granularity)
const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Payload stored in the client cache
#[derive(Clone)]
enum CacheValue {
    Page(FilePage),
    Meta(DriveFile),
    Search(Vec<DriveFile>),
}

/// Per-chunk upload progress: `(bytes_sent, total_bytes)`
pub type ProgressFn<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Caching, retrying client for the remote storage backend.
///
/// Reads (listing, metadata, search, download) run through the retry
/// policy; listing and metadata reads are additionally cached. Every
/// mutation invalidates the cache entries of the affected parent folder(s),
/// and move/rename/delete also invalidate by the file's own id.
///
/// The access token is supplied ready-to-use by the host's auth layer;
/// token refresh is outside this client's responsibility.
pub struct DriveClient {
    http: Arc<dyn HttpClient>,
    access_token: String,
    cache: TtlCache<CacheValue>,
    retry: RetryPolicy,
}

impl DriveClient {
    pub fn new(http: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http,
            access_token: access_token.into(),
            cache: TtlCache::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a client with explicit retry policy and cache TTL.
    pub fn with_policy(
        http: Arc<dyn HttpClient>,
        access_token: impl Into<String>,
        retry: RetryPolicy,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            http,
            access_token: access_token.into(),
            cache: TtlCache::new(cache_ttl),
            retry,
        }
    }

    /// List one page of a folder's direct, non-trashed children.
    #[instrument(skip(self))]
    pub async fn list_files(
        &self,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
        use_cache: bool,
    ) -> Result<FilePage> {
        let cache_key = format!(
            "files_{}_{}_{}",
            folder_id,
            page_size,
            page_token.unwrap_or("")
        );

        if use_cache {
            if let Some(CacheValue::Page(page)) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "Cache hit");
                return Ok(page);
            }
        }

        let query = Query::new()
            .in_parent(folder_id)
            .not_trashed()
            .build()
            .unwrap_or_default();
        let url = self.list_url(&query, page_size, page_token, DEFAULT_ORDER);

        let page = self
            .retry
            .run("list_files", || self.fetch_page(url.clone()))
            .await?;

        self.cache.insert(cache_key, CacheValue::Page(page.clone()));
        Ok(page)
    }

    /// Substring name search, optionally constrained to one folder.
    ///
    /// Search results are volatile, so callers opt in to caching; cache
    /// hits for stale searches are worse than the extra round trip.
    #[instrument(skip(self))]
    pub async fn search_files(
        &self,
        text: &str,
        folder_id: Option<&str>,
        use_cache: bool,
    ) -> Result<Vec<DriveFile>> {
        let cache_key = format!("search_{}_{}", text, folder_id.unwrap_or(""));

        if use_cache {
            if let Some(CacheValue::Search(files)) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "Cache hit");
                return Ok(files);
            }
        }

        let mut query = Query::new().name_contains(text).not_trashed();
        if let Some(folder) = folder_id {
            query = query.in_parent(folder);
        }
        let url = self.list_url(
            &query.build().unwrap_or_default(),
            SEARCH_PAGE_SIZE,
            None,
            DEFAULT_ORDER,
        );

        let page = self
            .retry
            .run("search_files", || self.fetch_page(url.clone()))
            .await?;

        if use_cache && !page.files.is_empty() {
            self.cache
                .insert(cache_key, CacheValue::Search(page.files.clone()));
        }
        Ok(page.files)
    }

    /// Fetch a file's metadata snapshot.
    #[instrument(skip(self))]
    pub async fn get_metadata(&self, file_id: &str, use_cache: bool) -> Result<DriveFile> {
        let cache_key = format!("fileinfo_{}", file_id);

        if use_cache {
            if let Some(CacheValue::Meta(file)) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "Cache hit");
                return Ok(file);
            }
        }

        let url = format!("{}/files/{}?fields={}", DRIVE_API_BASE, file_id, FILE_FIELDS);
        let file = self
            .retry
            .run("get_metadata", || self.fetch_metadata(url.clone(), file_id))
            .await?;

        self.cache.insert(cache_key, CacheValue::Meta(file.clone()));
        Ok(file)
    }

    /// Resolve a shareable link (or bare id) to `(file_id, metadata)`.
    #[instrument(skip(self))]
    pub async fn resolve_link(&self, link: &str) -> Result<(String, DriveFile)> {
        let file_id = link::extract_file_id(link)
            .ok_or_else(|| DriveError::InvalidLink(link.to_string()))?;
        let metadata = self.get_metadata(&file_id, true).await?;
        Ok((file_id, metadata))
    }

    /// Create a folder under `parent_id`.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveFile> {
        let url = format!("{}/files?fields={}", DRIVE_API_BASE, FILE_FIELDS);
        let body = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let folder = self
            .retry
            .run("create_folder", || {
                self.send_json(HttpMethod::Post, url.clone(), body.clone())
            })
            .await?;

        self.cache.invalidate(Some(parent_id));
        info!(folder_id = %folder.id, name, "Created folder");
        Ok(folder)
    }

    /// Return the folder named `name` under `parent_id`, creating it if
    /// it does not exist.
    pub async fn find_or_create_folder(&self, parent_id: &str, name: &str) -> Result<DriveFile> {
        if let Some(existing) = self
            .find_by_name(name, parent_id, Some(FOLDER_MIME_TYPE))
            .await?
        {
            return Ok(existing);
        }
        self.create_folder(name, parent_id).await
    }

    /// Upload a local file via a resumable session.
    ///
    /// `on_progress` is invoked after each chunk with
    /// `(bytes_sent, total_bytes)`. The upload is NOT retried: a partially
    /// sent resumable session is not safely restartable by a blind retry,
    /// so failure surfaces once.
    #[instrument(skip(self, on_progress))]
    pub async fn upload(
        &self,
        local_path: &Path,
        parent_id: &str,
        file_name: Option<&str>,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<DriveFile> {
        let name = match file_name {
            Some(name) => name.to_string(),
            None => local_path
                .file_name()
                .map(|n| sanitize_file_name(&n.to_string_lossy()))
                .ok_or_else(|| {
                    DriveError::Upload(format!("No file name in path {}", local_path.display()))
                })?,
        };

        let data = tokio::fs::read(local_path).await?;
        let total = data.len() as u64;

        let session_request = HttpRequest::new(
            HttpMethod::Post,
            format!(
                "{}/files?uploadType=resumable&fields={}",
                UPLOAD_API_BASE, FILE_FIELDS
            ),
        )
        .bearer_token(&self.access_token)
        .header("X-Upload-Content-Length", total.to_string())
        .json(&json!({ "name": name, "parents": [parent_id] }))?;

        let session_response = self.http.execute(session_request).await?;
        if !session_response.is_success() {
            return Err(DriveError::Upload(format!(
                "Session open failed with status {}",
                session_response.status
            )));
        }
        let session_url = session_response
            .header("Location")
            .ok_or_else(|| DriveError::Upload("Missing resumable session URI".to_string()))?
            .to_string();

        let mut offset = 0usize;
        let file = loop {
            let end = (offset + UPLOAD_CHUNK_SIZE).min(data.len());
            let content_range = if total == 0 {
                "bytes */0".to_string()
            } else {
                format!("bytes {}-{}/{}", offset, end - 1, total)
            };

            let request = HttpRequest::new(HttpMethod::Put, session_url.clone())
                .header("Content-Range", content_range)
                .body(Bytes::copy_from_slice(&data[offset..end]));
            let response = self.http.execute(request).await?;

            match response.status {
                // 308 Resume Incomplete: the server wants the next chunk
                308 => {
                    if let Some(progress) = on_progress {
                        progress(end as u64, total);
                    }
                    if end >= data.len() {
                        return Err(DriveError::Upload(
                            "Server expects more data than the local file holds".to_string(),
                        ));
                    }
                    offset = end;
                }
                status if (200..300).contains(&status) => {
                    if let Some(progress) = on_progress {
                        progress(total, total);
                    }
                    break response
                        .json::<DriveFile>()
                        .map_err(|e| DriveError::ParseError(e.to_string()))?;
                }
                status => {
                    return Err(DriveError::Upload(format!(
                        "Chunk upload failed with status {}",
                        status
                    )))
                }
            }
        };

        self.cache.invalidate(Some(parent_id));
        info!(file_id = %file.id, name = %file.name, size = total, "Uploaded file");
        Ok(file)
    }

    /// Replace a file's content from a local path, optionally renaming it.
    ///
    /// The content transfer is single-shot like `upload`: a partially
    /// applied media PATCH is not safely repeatable blind, and the store
    /// layer heals a failed mirror by re-uploading. The rename that
    /// follows is an idempotent metadata PATCH and is retried.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        file_id: &str,
        local_path: &Path,
        new_name: Option<&str>,
    ) -> Result<DriveFile> {
        let data = tokio::fs::read(local_path).await?;

        let url = format!(
            "{}/files/{}?uploadType=media&fields={}",
            UPLOAD_API_BASE, file_id, FILE_FIELDS
        );
        let request = HttpRequest::new(HttpMethod::Patch, url)
            .bearer_token(&self.access_token)
            .header("Content-Type", "application/octet-stream")
            .body(Bytes::from(data));
        let response = self.api_call(request).await?;
        let mut file: DriveFile = response
            .json()
            .map_err(|e| DriveError::ParseError(e.to_string()))?;

        if let Some(name) = new_name {
            let url = format!("{}/files/{}?fields={}", DRIVE_API_BASE, file_id, FILE_FIELDS);
            file = self
                .retry
                .run("update_rename", || {
                    self.send_json(HttpMethod::Patch, url.clone(), json!({ "name": name }))
                })
                .await?;
        }

        self.cache.invalidate(Some(file_id));
        Ok(file)
    }

    /// Download a file's content and decode it as UTF-8 text.
    #[instrument(skip(self))]
    pub async fn download_content(&self, file_id: &str) -> Result<String> {
        let url = format!("{}/files/{}?alt=media", DRIVE_API_BASE, file_id);
        let bytes = self
            .retry
            .run("download_content", || self.fetch_bytes(url.clone()))
            .await?;

        String::from_utf8(bytes.to_vec())
            .map_err(|e| DriveError::ParseError(format!("Content is not UTF-8: {}", e)))
    }

    /// Exact-name lookup under a parent; `Ok(None)` on a clean miss.
    #[instrument(skip(self))]
    pub async fn find_by_name(
        &self,
        name: &str,
        parent_id: &str,
        mime_type: Option<&str>,
    ) -> Result<Option<DriveFile>> {
        let mut query = Query::new()
            .name_equals(name)
            .in_parent(parent_id)
            .not_trashed();
        if let Some(mime) = mime_type {
            query = query.mime_type(mime);
        }
        let url = self.list_url(&query.build().unwrap_or_default(), 1, None, DEFAULT_ORDER);

        let page = self
            .retry
            .run("find_by_name", || self.fetch_page(url.clone()))
            .await?;
        Ok(page.files.into_iter().next())
    }

    /// Move a file to a new parent folder.
    #[instrument(skip(self))]
    pub async fn move_file(&self, file_id: &str, new_parent_id: &str) -> Result<DriveFile> {
        let current = self.get_metadata(file_id, false).await?;
        let previous_parents = current.parents.join(",");

        let url = format!(
            "{}/files/{}?addParents={}&removeParents={}&fields={}",
            DRIVE_API_BASE,
            file_id,
            urlencoding::encode(new_parent_id),
            urlencoding::encode(&previous_parents),
            FILE_FIELDS
        );
        let moved = self
            .retry
            .run("move_file", || {
                self.send_json(HttpMethod::Patch, url.clone(), json!({}))
            })
            .await?;

        for parent in &current.parents {
            self.cache.invalidate(Some(parent));
        }
        self.cache.invalidate(Some(new_parent_id));
        self.cache.invalidate(Some(file_id));
        Ok(moved)
    }

    /// Rename a file in place.
    #[instrument(skip(self))]
    pub async fn rename(&self, file_id: &str, new_name: &str) -> Result<DriveFile> {
        let url = format!("{}/files/{}?fields={}", DRIVE_API_BASE, file_id, FILE_FIELDS);
        let renamed = self
            .retry
            .run("rename", || {
                self.send_json(HttpMethod::Patch, url.clone(), json!({ "name": new_name }))
            })
            .await?;

        for parent in &renamed.parents {
            self.cache.invalidate(Some(parent));
        }
        self.cache.invalidate(Some(file_id));
        Ok(renamed)
    }

    /// Delete a file.
    ///
    /// Metadata is fetched *before* the delete so parent folders can still
    /// be invalidated once the object no longer exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        let metadata = self.get_metadata(file_id, false).await.ok();

        let url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        self.retry
            .run("delete", || self.delete_request(url.clone()))
            .await?;

        if let Some(metadata) = metadata {
            for parent in &metadata.parents {
                self.cache.invalidate(Some(parent));
            }
        }
        self.cache.invalidate(Some(file_id));
        Ok(())
    }

    /// Recursively list sub-folders (not files) up to `max_depth` levels.
    ///
    /// Depth 0 returns an empty tree. Each level is fully paginated.
    #[instrument(skip(self))]
    pub async fn folder_tree(&self, folder_id: &str, max_depth: u32) -> Result<Vec<FolderNode>> {
        if max_depth == 0 {
            return Ok(Vec::new());
        }

        let folders = self.list_subfolders(folder_id).await?;
        let mut nodes = Vec::with_capacity(folders.len());
        for folder in folders {
            let children = self.tree_boxed(folder.id.clone(), max_depth - 1).await?;
            nodes.push(FolderNode {
                id: folder.id,
                name: folder.name,
                children,
            });
        }
        Ok(nodes)
    }

    // ------------------------------------------------------------------
    // Wire helpers
    // ------------------------------------------------------------------

    fn tree_boxed<'a>(
        &'a self,
        folder_id: String,
        max_depth: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<FolderNode>>> + Send + 'a>> {
        Box::pin(async move { self.folder_tree(&folder_id, max_depth).await })
    }

    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let query = Query::new()
            .in_parent(folder_id)
            .is_folder()
            .not_trashed()
            .build()
            .unwrap_or_default();

        let mut results = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.list_url(&query, DEFAULT_PAGE_SIZE, page_token.as_deref(), DEFAULT_ORDER);
            let page = self
                .retry
                .run("list_subfolders", || self.fetch_page(url.clone()))
                .await?;
            results.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(results)
    }

    fn list_url(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
        order_by: &str,
    ) -> String {
        let mut url = format!(
            "{}/files?pageSize={}&orderBy={}&fields=nextPageToken,files({})",
            DRIVE_API_BASE,
            page_size,
            urlencoding::encode(order_by),
            FILE_FIELDS
        );
        if !query.is_empty() {
            url.push_str(&format!("&q={}", urlencoding::encode(query)));
        }
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        url
    }

    fn get_request(&self, url: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
    }

    async fn api_call(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http.execute(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(api_error(&response))
        }
    }

    async fn fetch_page(&self, url: String) -> Result<FilePage> {
        let response = self.api_call(self.get_request(&url)).await?;
        let parsed: FilesListResponse = response
            .json()
            .map_err(|e| DriveError::ParseError(e.to_string()))?;
        Ok(parsed.into())
    }

    async fn fetch_metadata(&self, url: String, file_id: &str) -> Result<DriveFile> {
        let response = self.http.execute(self.get_request(&url)).await?;
        if response.status == 404 {
            return Err(DriveError::FileNotFound {
                file_id: file_id.to_string(),
            });
        }
        if !response.is_success() {
            return Err(api_error(&response));
        }
        response
            .json()
            .map_err(|e| DriveError::ParseError(e.to_string()))
    }

    async fn fetch_bytes(&self, url: String) -> Result<Bytes> {
        let response = self.api_call(self.get_request(&url)).await?;
        Ok(response.body)
    }

    async fn send_json(
        &self,
        method: HttpMethod,
        url: String,
        body: serde_json::Value,
    ) -> Result<DriveFile> {
        let request = HttpRequest::new(method, url)
            .bearer_token(&self.access_token)
            .json(&body)?;
        let response = self.api_call(request).await?;
        response
            .json()
            .map_err(|e| DriveError::ParseError(e.to_string()))
    }

    async fn delete_request(&self, url: String) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Delete, url).bearer_token(&self.access_token);
        let response = self.http.execute(request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(api_error(&response))
        }
    }
}

fn api_error(response: &HttpResponse) -> DriveError {
    DriveError::ApiError {
        status_code: response.status,
        message: String::from_utf8_lossy(&response.body).to_string(),
    }
}
