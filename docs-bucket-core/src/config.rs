use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Result, SyncError};

pub const DEFAULT_STAGING_DIR: &str = "./tmp-files";
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Everything both pipelines need. Tokens are never part of the YAML file;
/// the loader injects them from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    pub source: SourceConfig,
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base of the document API, e.g. `https://docs.example.com/api`.
    pub api_base_url: String,
    /// Base used to build the human-facing document URL written into each file.
    pub docs_base_url: String,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(skip)]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Base of the knowledge API, e.g. `https://kb.example.com/api/v1`.
    pub api_url: String,
    /// Collection receiving every file that has no mapping.
    pub knowledge_collection_id: String,
    /// Collection directory name (as written by the export) to the knowledge
    /// collections its files are registered with.
    #[serde(default)]
    pub mappings: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    pub api_token: Option<String>,
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_DIR)
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl BucketConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source.api_base_url.trim().is_empty() {
            return Err(SyncError::config("source.api_base_url must not be empty"));
        }
        if self.source.page_limit == 0 {
            return Err(SyncError::config("source.page_limit must be greater than 0"));
        }
        if self.sink.api_url.trim().is_empty() {
            return Err(SyncError::config("sink.api_url must not be empty"));
        }
        if self.sink.knowledge_collection_id.trim().is_empty() {
            return Err(SyncError::config(
                "sink.knowledge_collection_id must not be empty",
            ));
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            staging_dir = %self.staging_dir.display(),
            source = %self.source.api_base_url,
            sink = %self.sink.api_url,
            page_limit = self.source.page_limit,
            mappings = self.sink.mappings.len(),
            source_token = self.source.api_token.is_some(),
            sink_token = self.sink.api_token.is_some(),
            "Loaded BucketConfig"
        );
        debug!(mappings = ?self.sink.mappings, "Collection mappings");
    }
}
