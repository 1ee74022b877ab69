use serde::{Deserialize, Serialize};

/// One normalized scan row in the canonical interchange shape.
///
/// VA rows populate `cve` and `vpr_score`; HA rows populate `status`.
/// Required columns (`host`, `port`, `name`) are non-null by construction;
/// the optional text fields keep file-level nulls until finalization fills
/// or rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub cve: Option<String>,
    pub risk: Option<String>,
    pub host: String,
    pub port: i64,
    pub name: String,
    pub description: Option<String>,
    pub remediation: Option<String>,
    pub evidence: Option<String>,
    pub vpr_score: Option<String>,
    pub status: Option<String>,
}
