use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::severity::Severity;
use super::status::FindingStatus;

/// A vulnerability identity (title + description), scoped to a product.
/// Created once on first sighting and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingName {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One occurrence of a FindingName on a host/port for a plugin/product,
/// possibly under a label (parallel finding set).
///
/// At most one non-terminal row exists per
/// (finding_name_id, host, port, plugin_id, product_id, label); a terminal
/// row that reappears in a later upload is re-inserted as a fresh row, which
/// is how a reopen is physically represented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: Uuid,
    pub finding_name_id: Uuid,
    pub product_id: Uuid,
    pub plugin_id: Uuid,
    pub host: String,
    pub port: i64,
    pub status: FindingStatus,
    pub severity: Severity,
    pub reopen: bool,
    pub vpr_score: Option<String>,
    pub evidence: String,
    pub remediation: String,
    pub remark: Option<String>,
    pub internal_remark: Option<String>,
    /// First time this occurrence was seen.
    pub finding_date: NaiveDate,
    /// Most recent upload that confirmed this occurrence.
    pub last_update: NaiveDate,
    pub closed_at: Option<NaiveDate>,
    /// Days between discovery and closure, stamped once at the terminal
    /// transition.
    pub closing_effort: Option<i64>,
    pub delay_untill: Option<NaiveDate>,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}
