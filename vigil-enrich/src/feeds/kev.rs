//! CISA Known Exploited Vulnerabilities catalog.

use serde::Deserialize;

/// The full KEV catalog, fetched once per enrichment run.
#[derive(Debug, Default, Deserialize)]
pub struct KevCatalog {
    #[serde(default)]
    pub vulnerabilities: Vec<KevEntry>,
}

#[derive(Debug, Deserialize)]
pub struct KevEntry {
    #[serde(rename = "cveID")]
    pub cve_id: String,
    #[serde(default, rename = "knownRansomwareCampaignUse")]
    pub known_ransomware_campaign_use: Option<String>,
}

impl KevCatalog {
    /// Ransomware-campaign note for a listed CVE, upper-cased.
    pub fn ransomware_use(&self, cve_id: &str) -> Option<String> {
        self.vulnerabilities
            .iter()
            .find(|entry| entry.cve_id == cve_id)
            .map(|entry| {
                entry
                    .known_ransomware_campaign_use
                    .as_deref()
                    .unwrap_or("")
                    .to_ascii_uppercase()
            })
    }
}
