//! Source → staging directory pipeline.
//!
//! Pages through `documents.list` (most recently updated first) until an empty
//! page comes back, exports every listed document and writes it to
//! `<staging_dir>/[<collection>/]<title>.md` with the public document URL as
//! the first line.
//!
//! # Error Handling
//! A failed page fetch aborts the run and is returned. Anything that goes
//! wrong for a single document (export call, directory creation, write) is
//! logged, recorded in the [`ExportReport`] and skipped. A failed collection
//! lookup is not a failure at all: the file goes to the staging root instead.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::collection_cache::CollectionNameCache;
use crate::config::BucketConfig;
use crate::error::{Result, SyncError};
use crate::report::{ExportReport, ItemOutcome};
use crate::sanitize::{filename_safe, slugify};
use crate::source::{Document, SourceApi};

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub staging_dir: PathBuf,
    pub docs_base_url: String,
    pub page_limit: u32,
}

impl From<&BucketConfig> for ExportConfig {
    fn from(config: &BucketConfig) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            docs_base_url: config.source.docs_base_url.clone(),
            page_limit: config.source.page_limit,
        }
    }
}

/// Public URL of a document: `<docs_base>/<slugified title>-<url id>`.
pub fn document_url(docs_base_url: &str, document: &Document) -> String {
    format!(
        "{}/{}-{}",
        docs_base_url.trim_end_matches('/'),
        slugify(&document.title),
        document.url_slug_id
    )
}

/// File stem for a document. Titles that sanitise to nothing fall back to the
/// document id so the file never ends up as a bare `.md`.
fn file_stem(document: &Document) -> String {
    let stem = filename_safe(&document.title);
    if stem.is_empty() {
        filename_safe(&document.id)
    } else {
        stem
    }
}

pub struct ExportPipeline<S> {
    source: Arc<S>,
    names: CollectionNameCache<S>,
    config: ExportConfig,
}

impl<S: SourceApi> ExportPipeline<S> {
    pub fn new(source: Arc<S>, config: ExportConfig) -> Self {
        Self {
            names: CollectionNameCache::new(Arc::clone(&source)),
            source,
            config,
        }
    }

    pub fn collection_names(&self) -> &CollectionNameCache<S> {
        &self.names
    }

    pub async fn run(&self) -> Result<ExportReport> {
        let limit = self.config.page_limit;
        if limit == 0 {
            return Err(SyncError::config("page limit must be greater than 0"));
        }

        info!(
            staging_dir = %self.config.staging_dir.display(),
            limit,
            "[EXPORT] Starting export"
        );

        let mut report = ExportReport::default();
        let mut offset: u64 = 0;
        loop {
            let page = match self.source.list_documents(offset, limit).await {
                Ok(page) => page,
                Err(e) => {
                    error!(offset, error = %e, "[EXPORT][ERROR] Failed to fetch documents");
                    return Err(e);
                }
            };
            report.pages_fetched += 1;

            if page.is_empty() {
                break;
            }
            info!(offset, count = page.len(), "[EXPORT] Processing page");

            for document in &page {
                match self.export(document).await {
                    Ok(path) => {
                        report.documents.push(ItemOutcome::succeeded(&document.id));
                        report.written.push(path);
                    }
                    Err(e) => {
                        warn!(document_id = %document.id, error = %e, "[EXPORT] Error exporting document");
                        report.documents.push(ItemOutcome::failed(&document.id, e));
                    }
                }
            }

            offset += u64::from(limit);
        }

        info!(
            pages = report.pages_fetched,
            exported = report.succeeded(),
            failed = report.failed(),
            "[EXPORT] Export completed"
        );
        Ok(report)
    }

    /// Exports one document and writes it into the staging directory,
    /// overwriting whatever was there. Returns the written path.
    pub async fn export(&self, document: &Document) -> Result<PathBuf> {
        let url = document_url(&self.config.docs_base_url, document);
        let body = self.source.export_document(&document.id).await?;

        let dir = self.destination_dir(document).await;
        std::fs::create_dir_all(&dir).map_err(|e| SyncError::io(&dir, e))?;

        let path = dir.join(format!("{}.md", file_stem(document)));
        std::fs::write(&path, format!("Document URL: {url}\n\n{body}"))
            .map_err(|e| SyncError::io(&path, e))?;

        info!(document_id = %document.id, path = %path.display(), "[EXPORT] Saved document");
        Ok(path)
    }

    async fn destination_dir(&self, document: &Document) -> PathBuf {
        let root = &self.config.staging_dir;
        let Some(collection_id) = document.collection() else {
            return root.clone();
        };

        match self.names.resolve(collection_id).await {
            Ok(name) => {
                let dir_name = filename_safe(&name);
                if dir_name.is_empty() {
                    warn!(collection_id, name = %name, "[EXPORT] Collection name sanitises to nothing, using staging root");
                    root.clone()
                } else {
                    root.join(dir_name)
                }
            }
            Err(e) => {
                warn!(
                    document_id = %document.id,
                    collection_id,
                    error = %e,
                    "[EXPORT] Error fetching collection name, using staging root"
                );
                root.clone()
            }
        }
    }
}
