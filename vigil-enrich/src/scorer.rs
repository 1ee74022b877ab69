//! The priority decision table.

use vigil_core::types::{Priority, PriorityResult, Severity};

use crate::feeds::{EpssScore, NvdDetail};

/// Classifies CVEs into priority tiers from CVSS score, EPSS probability,
/// and KEV membership. Unknown scores compare as negative infinity, so a
/// fully unresolved CVE lands in tier 4.
#[derive(Debug, Clone, Copy)]
pub struct PriorityScorer {
    cvss_threshold: f64,
    epss_threshold: f64,
}

impl PriorityScorer {
    pub fn new(cvss_threshold: f64, epss_threshold: f64) -> Self {
        PriorityScorer {
            cvss_threshold,
            epss_threshold,
        }
    }

    /// First matching tier wins; the table is total.
    pub fn tier(&self, cvss: Option<f64>, epss: Option<f64>, kev: bool) -> Priority {
        if kev {
            return Priority::OnePlus;
        }
        let cvss = cvss.unwrap_or(f64::NEG_INFINITY);
        let epss = epss.unwrap_or(f64::NEG_INFINITY);
        if cvss >= self.cvss_threshold {
            if epss >= self.epss_threshold {
                Priority::One
            } else {
                Priority::Two
            }
        } else if epss >= self.epss_threshold {
            Priority::Three
        } else {
            Priority::Four
        }
    }

    /// Combine the feed lookups for one CVE into its write-back row. The
    /// NVD severity only carries through when it parses into a known tier,
    /// so the ingestion-derived severity is never clobbered by junk.
    pub fn score(&self, cve_id: &str, detail: &NvdDetail, epss: &EpssScore) -> PriorityResult {
        PriorityResult {
            cve_id: cve_id.to_string(),
            priority: self.tier(detail.cvss, epss.epss, detail.kev_eligible),
            epss: epss.epss,
            cvss: detail.cvss,
            cvss_version: detail.cvss_version.clone(),
            severity: detail
                .severity
                .as_deref()
                .and_then(Severity::parse)
                .map(|s| s.as_str().to_string()),
            vector: detail.vector.clone(),
            kev_list: detail.kev_eligible,
        }
    }
}
