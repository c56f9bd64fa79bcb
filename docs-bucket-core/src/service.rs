//! The two trigger operations offered to callers (CLI, HTTP layer, ...).
//!
//! Each builds the real HTTP clients from a [`BucketConfig`], runs one
//! pipeline to completion and folds the result into a [`TriggerOutcome`].

use std::sync::Arc;

use crate::config::BucketConfig;
use crate::error::{Result, SyncError};
use crate::export::{ExportConfig, ExportPipeline};
use crate::rate_limit::RateLimitedClient;
use crate::report::{ExportReport, SyncReport};
use crate::sink::SinkClient;
use crate::source::SourceClient;
use crate::synchronise::{SyncConfig, SyncPipeline};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub success: bool,
    pub message: String,
}

impl TriggerOutcome {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

pub fn export_outcome(result: Result<ExportReport>) -> TriggerOutcome {
    match result {
        Ok(report) => TriggerOutcome::ok(format!("Export completed: {}.", report.summary())),
        Err(e) => TriggerOutcome::failed(format!("Error fetching documents: {e}")),
    }
}

pub fn upload_outcome(result: Result<SyncReport>) -> TriggerOutcome {
    match result {
        Ok(report) => TriggerOutcome::ok(format!("Upload completed: {}.", report.summary())),
        Err(e @ SyncError::Io { .. }) => {
            TriggerOutcome::failed(format!("Error reading directory: {e}"))
        }
        Err(e) => TriggerOutcome::failed(format!("Error clearing knowledge collection: {e}")),
    }
}

pub async fn run_export(config: &BucketConfig) -> TriggerOutcome {
    if let Err(e) = config.validate() {
        return TriggerOutcome::failed(e.to_string());
    }
    let source = Arc::new(SourceClient::new(
        RateLimitedClient::new(reqwest::Client::new()),
        &config.source,
    ));
    let pipeline = ExportPipeline::new(source, ExportConfig::from(config));
    export_outcome(pipeline.run().await)
}

pub async fn run_upload(config: &BucketConfig) -> TriggerOutcome {
    if let Err(e) = config.validate() {
        return TriggerOutcome::failed(e.to_string());
    }
    let sink = Arc::new(SinkClient::new(
        RateLimitedClient::new(reqwest::Client::new()),
        &config.sink,
    ));
    let pipeline = SyncPipeline::new(sink, SyncConfig::from(config));
    upload_outcome(pipeline.run().await)
}
