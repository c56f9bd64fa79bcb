//! # sink: the downstream knowledge-base API
//!
//! [`KnowledgeApi`] abstracts the four calls the sync pipeline makes against a
//! knowledge collection; [`SinkClient`] implements them over HTTP:
//!
//! - `GET  {base}/knowledge/{id}`             → `{files: [{id}]}`
//! - `POST {base}/knowledge/{id}/file/remove` `{file_id}`
//! - `POST {base}/files/` (multipart, field `file`) → `{id}`
//! - `POST {base}/knowledge/{id}/file/add`    `{file_id}`
//!
//! The trait is mocked with `mockall` in the pipeline tests; the client is
//! exercised against `wiremock` servers.

use std::path::Path;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::SinkConfig;
use crate::error::{Result, SyncError};
use crate::rate_limit::RateLimitedClient;
use crate::response::{authorized, check_status, decode_json};

/// A file as known to the sink. The id is the only handle kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkFile {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct KnowledgeResponse {
    #[serde(default)]
    files: Option<Vec<SinkFile>>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    id: Option<String>,
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait KnowledgeApi: Send + Sync {
    /// Files currently registered with a knowledge collection.
    async fn list_files(&self, collection_id: &str) -> Result<Vec<SinkFile>>;

    async fn remove_file(&self, collection_id: &str, file_id: &str) -> Result<()>;

    /// Uploads a local file and returns the id the sink assigned to it.
    async fn upload_file(&self, path: &Path) -> Result<SinkFile>;

    async fn add_file(&self, collection_id: &str, file_id: &str) -> Result<()>;
}

pub struct SinkClient {
    http: RateLimitedClient,
    base_url: String,
    api_token: Option<String>,
}

impl SinkClient {
    pub fn new(http: RateLimitedClient, config: &SinkConfig) -> Self {
        Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    async fn post_file_id(
        &self,
        operation: &'static str,
        url: String,
        file_id: &str,
    ) -> Result<()> {
        let body = json!({ "file_id": file_id });
        let response = self
            .http
            .execute(|client| authorized(client.post(&url), self.api_token.as_deref()).json(&body))
            .await
            .map_err(|e| SyncError::transport(operation, e))?;
        check_status(response, operation, &[StatusCode::OK]).await?;
        Ok(())
    }
}

#[async_trait]
impl KnowledgeApi for SinkClient {
    async fn list_files(&self, collection_id: &str) -> Result<Vec<SinkFile>> {
        const OPERATION: &str = "knowledge.list";
        let url = format!("{}/knowledge/{}", self.base_url, collection_id);
        let response = self
            .http
            .execute(|client| {
                authorized(client.get(&url), self.api_token.as_deref())
                    .header(ACCEPT, "application/json")
            })
            .await
            .map_err(|e| SyncError::transport(OPERATION, e))?;
        let response = check_status(response, OPERATION, &[StatusCode::OK]).await?;
        let knowledge: KnowledgeResponse = decode_json(response, OPERATION).await?;
        let files = knowledge.files.unwrap_or_default();
        debug!(collection_id, count = files.len(), "Listed knowledge collection");
        Ok(files)
    }

    async fn remove_file(&self, collection_id: &str, file_id: &str) -> Result<()> {
        let url = format!("{}/knowledge/{}/file/remove", self.base_url, collection_id);
        self.post_file_id("knowledge.file.remove", url, file_id)
            .await?;
        info!(collection_id, file_id, "Removed file from knowledge collection");
        Ok(())
    }

    async fn upload_file(&self, path: &Path) -> Result<SinkFile> {
        const OPERATION: &str = "files.upload";
        let content = std::fs::read(path).map_err(|e| SyncError::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let url = format!("{}/files/", self.base_url);
        let response = self
            .http
            .execute(|client| {
                let part = Part::bytes(content.clone()).file_name(file_name.clone());
                authorized(client.post(&url), self.api_token.as_deref())
                    .header(ACCEPT, "application/json")
                    .multipart(Form::new().part("file", part))
            })
            .await
            .map_err(|e| SyncError::transport(OPERATION, e))?;
        let response =
            check_status(response, OPERATION, &[StatusCode::OK, StatusCode::CREATED]).await?;
        let uploaded: UploadResponse = decode_json(response, OPERATION).await?;

        match uploaded.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                info!(path = %path.display(), file_id = %id, "Uploaded file");
                Ok(SinkFile { id })
            }
            None => Err(SyncError::MissingFileId {
                operation: OPERATION,
            }),
        }
    }

    async fn add_file(&self, collection_id: &str, file_id: &str) -> Result<()> {
        let url = format!("{}/knowledge/{}/file/add", self.base_url, collection_id);
        self.post_file_id("knowledge.file.add", url, file_id).await?;
        info!(collection_id, file_id, "Added file to knowledge collection");
        Ok(())
    }
}
