//! Staging directory → knowledge collection pipeline.
//!
//! A run is a full refresh in two phases:
//!
//! 1. **Clear**: every target knowledge collection is listed and each of its
//!    files is removed. If a listing fails the run stops here, before any
//!    upload. A failed removal is recorded and the next one is attempted.
//! 2. **Populate**: every `.md` file in the staging directory (root and one
//!    level of collection subdirectories) is uploaded and registered with the
//!    collections it maps to. A failed file is recorded and skipped.
//!
//! Readers of the sink see an empty collection between the two phases.
//!
//! # Collection routing
//! Files directly under the staging root go to the default knowledge
//! collection. Files under `<staging>/<dir>/` go to the collections mapped for
//! `<dir>` in [`SyncConfig::mappings`], or to the default when there is none.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::config::BucketConfig;
use crate::error::{Result, SyncError};
use crate::report::{ItemOutcome, SyncReport};
use crate::sink::KnowledgeApi;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub staging_dir: PathBuf,
    pub knowledge_collection_id: String,
    pub mappings: BTreeMap<String, Vec<String>>,
}

impl From<&BucketConfig> for SyncConfig {
    fn from(config: &BucketConfig) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            knowledge_collection_id: config.sink.knowledge_collection_id.clone(),
            mappings: config.sink.mappings.clone(),
        }
    }
}

impl SyncConfig {
    /// Every collection the clear phase empties: the default first, then each
    /// mapped collection once, in mapping order.
    pub fn target_collections(&self) -> Vec<String> {
        let mut targets = vec![self.knowledge_collection_id.clone()];
        for id in self.mappings.values().flatten() {
            let id = id.trim();
            if !id.is_empty() && !targets.iter().any(|t| t == id) {
                targets.push(id.to_string());
            }
        }
        targets
    }

    /// Collections a staged file is registered with, from its path relative to
    /// the staging directory.
    pub fn collections_for(&self, relative: &Path) -> Vec<String> {
        let mapped = relative
            .parent()
            .and_then(|parent| parent.components().next())
            .and_then(|dir| self.mappings.get(&*dir.as_os_str().to_string_lossy()))
            .map(|ids| {
                ids.iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if mapped.is_empty() {
            vec![self.knowledge_collection_id.clone()]
        } else {
            mapped
        }
    }
}

/// A Markdown file found in the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    /// Path relative to the staging directory, used in logs and reports.
    pub relative: PathBuf,
    pub collections: Vec<String>,
}

/// Lists the `.md` files under the staging directory, sorted by path.
///
/// Fails only if the staging directory itself cannot be read; unreadable
/// entries below it are logged and skipped.
pub fn staged_files(config: &SyncConfig) -> Result<Vec<StagedFile>> {
    let root = &config.staging_dir;
    std::fs::read_dir(root).map_err(|e| SyncError::io(root, e))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "[SYNC] Skipping unreadable staging entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !entry.file_name().to_string_lossy().ends_with(".md") {
            continue;
        }

        let path = entry.into_path();
        let relative = path.strip_prefix(root).unwrap_or(path.as_path()).to_path_buf();
        files.push(StagedFile {
            collections: config.collections_for(&relative),
            relative,
            path,
        });
    }
    Ok(files)
}

pub struct SyncPipeline<K> {
    sink: Arc<K>,
    config: SyncConfig,
}

impl<K: KnowledgeApi> SyncPipeline<K> {
    pub fn new(sink: Arc<K>, config: SyncConfig) -> Self {
        Self { sink, config }
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let mut report = SyncReport {
            collections: self.config.target_collections(),
            ..SyncReport::default()
        };
        info!(
            staging_dir = %self.config.staging_dir.display(),
            collections = ?report.collections,
            "[SYNC] Starting sync"
        );

        for collection_id in report.collections.clone() {
            if let Err(e) = self.clear_collection(&collection_id, &mut report).await {
                error!(collection_id = %collection_id, error = %e, "[SYNC][ERROR] Failed to clear knowledge collection");
                return Err(e);
            }
        }
        info!(
            removed = report.removed(),
            failed = report.removal_failures(),
            "[SYNC] Knowledge collections cleared"
        );

        let files = match staged_files(&self.config) {
            Ok(files) => files,
            Err(e) => {
                error!(error = %e, "[SYNC][ERROR] Failed to read staging directory");
                return Err(e);
            }
        };

        for file in &files {
            let item = file.relative.display().to_string();
            match self.upload_and_register(file).await {
                Ok(file_id) => {
                    info!(file = %item, file_id = %file_id, "[SYNC] Uploaded and registered file");
                    report.uploads.push(ItemOutcome::succeeded(item));
                }
                Err(e) => {
                    warn!(file = %item, error = %e, "[SYNC] Error uploading file");
                    report.uploads.push(ItemOutcome::failed(item, e));
                }
            }
        }

        info!(summary = %report.summary(), "[SYNC] Sync completed");
        Ok(report)
    }

    /// Removes every file from one knowledge collection. Only a failed listing
    /// is returned as an error.
    pub async fn clear_collection(
        &self,
        collection_id: &str,
        report: &mut SyncReport,
    ) -> Result<()> {
        let files = self.sink.list_files(collection_id).await?;
        info!(collection_id, count = files.len(), "[SYNC] Clearing knowledge collection");

        for file in files {
            match self.sink.remove_file(collection_id, &file.id).await {
                Ok(()) => report.removals.push(ItemOutcome::succeeded(file.id)),
                Err(e) => {
                    warn!(collection_id, file_id = %file.id, error = %e, "[SYNC] Error removing file");
                    report.removals.push(ItemOutcome::failed(file.id, e));
                }
            }
        }
        Ok(())
    }

    async fn upload_and_register(&self, file: &StagedFile) -> Result<String> {
        let uploaded = self.sink.upload_file(&file.path).await?;
        for collection_id in &file.collections {
            self.sink.add_file(collection_id, &uploaded.id).await?;
        }
        Ok(uploaded.id)
    }
}
