//! # source: the upstream document API
//!
//! [`SourceApi`] is the seam the export pipeline and the collection-name cache
//! are written against. [`SourceClient`] implements it over HTTP:
//!
//! - `POST {base}/documents.list`   `{offset, limit, sort, direction}` → `{data: [Document]}`
//! - `POST {base}/documents.export` `{id}` → `{data: "<markdown>"}`
//! - `POST {base}/collections.info` `{id}` → `{data: {id, name}}`
//!
//! Every call is authenticated with the bearer token from [`SourceConfig`] and
//! goes through [`RateLimitedClient`], so 429 responses never reach callers.
//! Anything but `200 OK` is a [`SyncError::Status`].

use async_trait::async_trait;
use mockall::automock;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{Result, SyncError};
use crate::rate_limit::RateLimitedClient;
use crate::response::{authorized, check_status, decode_json};

/// A document as listed by the source. Only lives for one export pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Short id used in the public document URL.
    #[serde(rename = "urlId", default)]
    pub url_slug_id: String,
    #[serde(
        rename = "collectionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_id: Option<String>,
}

impl Document {
    /// The collection id, treating an empty string like an absent one.
    pub fn collection(&self) -> Option<&str> {
        self.collection_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct ListDocumentsRequest {
    offset: u64,
    limit: u32,
    sort: &'static str,
    direction: &'static str,
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// One page of documents, most recently updated first. An empty page
    /// means there is nothing left.
    async fn list_documents(&self, offset: u64, limit: u32) -> Result<Vec<Document>>;

    /// The exported Markdown body of a document.
    async fn export_document(&self, document_id: &str) -> Result<String>;

    async fn collection_info(&self, collection_id: &str) -> Result<Collection>;
}

pub struct SourceClient {
    http: RateLimitedClient,
    base_url: String,
    api_token: Option<String>,
}

impl SourceClient {
    pub fn new(http: RateLimitedClient, config: &SourceConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    async fn call<T, B>(&self, operation: &'static str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = format!("{}/{}", self.base_url, operation);
        let response = self
            .http
            .execute(|client| authorized(client.post(&url), self.api_token.as_deref()).json(body))
            .await
            .map_err(|e| SyncError::transport(operation, e))?;
        let response = check_status(response, operation, &[StatusCode::OK]).await?;
        let envelope: DataEnvelope<T> = decode_json(response, operation).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl SourceApi for SourceClient {
    async fn list_documents(&self, offset: u64, limit: u32) -> Result<Vec<Document>> {
        let request = ListDocumentsRequest {
            offset,
            limit,
            sort: "updatedAt",
            direction: "DESC",
        };
        let documents: Vec<Document> = self.call("documents.list", &request).await?;
        debug!(offset, limit, count = documents.len(), "Fetched document page");
        Ok(documents)
    }

    async fn export_document(&self, document_id: &str) -> Result<String> {
        self.call("documents.export", &json!({ "id": document_id }))
            .await
    }

    async fn collection_info(&self, collection_id: &str) -> Result<Collection> {
        self.call("collections.info", &json!({ "id": collection_id }))
            .await
    }
}
