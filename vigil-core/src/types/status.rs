use serde::{Deserialize, Serialize};

use super::assessment::AssessmentKind;

/// Lifecycle status of a finding occurrence.
///
/// VA findings are driven by reconciliation: NEW on first sight, OPEN on
/// reconfirmation, CLOSED when absent from a later upload. EXEMPTION and
/// OTHERS are assigned manually and behave like open states. HA findings
/// carry their check result straight from the export and terminate at PASSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingStatus {
    New,
    Open,
    Closed,
    Exemption,
    Others,
    Passed,
    Failed,
    Warning,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::New => "NEW",
            FindingStatus::Open => "OPEN",
            FindingStatus::Closed => "CLOSED",
            FindingStatus::Exemption => "EXEMPTION",
            FindingStatus::Others => "OTHERS",
            FindingStatus::Passed => "PASSED",
            FindingStatus::Failed => "FAILED",
            FindingStatus::Warning => "WARNING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NEW" => Some(FindingStatus::New),
            "OPEN" => Some(FindingStatus::Open),
            "CLOSED" => Some(FindingStatus::Closed),
            "EXEMPTION" => Some(FindingStatus::Exemption),
            "OTHERS" => Some(FindingStatus::Others),
            "PASSED" => Some(FindingStatus::Passed),
            "FAILED" => Some(FindingStatus::Failed),
            "WARNING" => Some(FindingStatus::Warning),
            _ => None,
        }
    }

    /// Statuses an HA export file may declare for a check.
    pub fn parse_ha(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PASSED" => Some(FindingStatus::Passed),
            "FAILED" => Some(FindingStatus::Failed),
            "WARNING" => Some(FindingStatus::Warning),
            _ => None,
        }
    }

    /// The terminal status for the given assessment kind. Rows in this
    /// status are excluded from the live-occurrence uniqueness constraint.
    pub fn terminal_for(kind: AssessmentKind) -> FindingStatus {
        match kind {
            AssessmentKind::Va => FindingStatus::Closed,
            AssessmentKind::Ha => FindingStatus::Passed,
        }
    }

    pub fn is_terminal(&self, kind: AssessmentKind) -> bool {
        *self == Self::terminal_for(kind)
    }
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
