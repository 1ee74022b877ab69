use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::priority::Priority;
use super::severity::Severity;

/// A distinct CVE identifier tied to a finding identity.
///
/// Created during ingestion with only `name`, `severity`, and the owning
/// finding name; the scoring fields stay empty until the enrichment job
/// fills them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CveRecord {
    pub id: Uuid,
    /// Globally unique identifier, `CVE-YYYY-NNNN…`.
    pub name: String,
    pub finding_name_id: Option<Uuid>,
    pub severity: Severity,
    pub priority: Option<Priority>,
    pub epss: Option<f64>,
    pub cvss: Option<f64>,
    pub cvss_version: Option<String>,
    pub kev_list: bool,
    pub vector: Option<String>,
    pub created_at: DateTime<Utc>,
}
