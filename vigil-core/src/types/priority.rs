use serde::{Deserialize, Serialize};

/// Urgency tier for a CVE, derived from CVSS, EPSS, and KEV membership.
///
/// `1+` marks active in-the-wild exploitation and outranks every score-based
/// tier; `4` is the catch-all, including CVEs whose enrichment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "1+")]
    OnePlus,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::OnePlus => "1+",
            Priority::One => "1",
            Priority::Two => "2",
            Priority::Three => "3",
            Priority::Four => "4",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1+" => Some(Priority::OnePlus),
            "1" => Some(Priority::One),
            "2" => Some(Priority::Two),
            "3" => Some(Priority::Three),
            "4" => Some(Priority::Four),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrichment outcome for a single CVE, written back to the CVE table and
/// returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityResult {
    pub cve_id: String,
    pub priority: Priority,
    pub epss: Option<f64>,
    pub cvss: Option<f64>,
    pub cvss_version: Option<String>,
    pub severity: Option<String>,
    pub vector: Option<String>,
    pub kev_list: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trip() {
        for tier in [
            Priority::OnePlus,
            Priority::One,
            Priority::Two,
            Priority::Three,
            Priority::Four,
        ] {
            assert_eq!(Priority::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(Priority::parse("5"), None);
    }
}
