//! Per-item outcomes and run summaries returned by the pipelines.

use std::path::PathBuf;

/// What happened to one document, file, or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded { item: String },
    Failed { item: String, reason: String },
}

impl ItemOutcome {
    pub fn succeeded(item: impl Into<String>) -> Self {
        Self::Succeeded { item: item.into() }
    }

    pub fn failed(item: impl Into<String>, reason: impl ToString) -> Self {
        Self::Failed {
            item: item.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn item(&self) -> &str {
        match self {
            Self::Succeeded { item } | Self::Failed { item, .. } => item,
        }
    }
}

fn count(outcomes: &[ItemOutcome], success: bool) -> usize {
    outcomes.iter().filter(|o| o.is_success() == success).count()
}

#[derive(Debug, Default)]
pub struct ExportReport {
    /// Number of `documents.list` calls, including the final empty page.
    pub pages_fetched: usize,
    /// One entry per listed document; successful items name the written file.
    pub documents: Vec<ItemOutcome>,
    pub written: Vec<PathBuf>,
}

impl ExportReport {
    pub fn succeeded(&self) -> usize {
        count(&self.documents, true)
    }

    pub fn failed(&self) -> usize {
        count(&self.documents, false)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} exported, {} failed",
            self.succeeded(),
            self.failed()
        )
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    /// Knowledge collections that were cleared and repopulated.
    pub collections: Vec<String>,
    /// One entry per removal attempted in the clear phase.
    pub removals: Vec<ItemOutcome>,
    /// One entry per staged `.md` file.
    pub uploads: Vec<ItemOutcome>,
}

impl SyncReport {
    pub fn removed(&self) -> usize {
        count(&self.removals, true)
    }

    pub fn removal_failures(&self) -> usize {
        count(&self.removals, false)
    }

    pub fn uploaded(&self) -> usize {
        count(&self.uploads, true)
    }

    pub fn upload_failures(&self) -> usize {
        count(&self.uploads, false)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} removed ({} failed), {} uploaded ({} failed)",
            self.removed(),
            self.removal_failures(),
            self.uploaded(),
            self.upload_failures()
        )
    }
}
