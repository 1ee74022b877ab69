use serde::{Deserialize, Serialize};

/// The two assessment families a normalizer plugin can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    /// Vulnerability assessment: CVE-bearing scanner output.
    Va,
    /// Hardening assessment: pass/fail compliance checks.
    Ha,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::Va => "va",
            AssessmentKind::Ha => "ha",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "va" => Some(AssessmentKind::Va),
            "ha" => Some(AssessmentKind::Ha),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
