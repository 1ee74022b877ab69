use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::AssessmentKind;

/// Metadata accompanying one uploaded scan export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadContext {
    pub product_id: Uuid,
    pub plugin_id: Uuid,
    pub kind: AssessmentKind,
    /// Day the scan was taken. All lifecycle arithmetic is day-granular.
    pub scan_date: NaiveDate,
    /// When false, rows for never-seen (host, port, name) triples are
    /// discarded instead of creating new finding identities.
    pub process_new_finding: bool,
    /// Re-upload of an already ingested day: snapshot the product first,
    /// then replace that day's rows.
    pub overwrite: bool,
    pub label: Option<String>,
}

impl UploadContext {
    /// Label as persisted: trimmed, with the empty string standing in for
    /// "no label" so the uniqueness constraint covers unlabeled rows as one
    /// group.
    pub fn storage_label(&self) -> String {
        self.label.as_deref().unwrap_or("").trim().to_string()
    }
}

/// Row counters reported back from one reconciliation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSummary {
    /// Fresh occurrence rows inserted.
    pub created: usize,
    /// Live occurrences reconfirmed in place.
    pub updated: usize,
    /// Rows swept to the terminal status by this upload.
    pub closed: usize,
    /// Closed rows newly flagged as reopened.
    pub reopened: usize,
}
