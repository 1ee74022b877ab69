//! NVD CVE API response shapes and CVSS metric extraction.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NvdResponse {
    #[serde(default, rename = "totalResults")]
    pub total_results: u64,
    #[serde(default)]
    pub vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Deserialize)]
pub struct NvdVulnerability {
    pub cve: NvdCve,
}

#[derive(Debug, Deserialize)]
pub struct NvdCve {
    #[serde(default, rename = "vulnStatus")]
    pub vuln_status: Option<String>,
    /// Date the CVE was added to the CISA KEV catalog; presence marks
    /// KEV eligibility.
    #[serde(default, rename = "cisaExploitAdd")]
    pub cisa_exploit_add: Option<String>,
    /// Metric families keyed by name (`cvssMetricV31`, ...).
    #[serde(default)]
    pub metrics: HashMap<String, Vec<NvdMetric>>,
}

#[derive(Debug, Deserialize)]
pub struct NvdMetric {
    #[serde(default, rename = "cvssData")]
    pub cvss_data: CvssData,
}

#[derive(Debug, Default, Deserialize)]
pub struct CvssData {
    #[serde(default, rename = "baseScore")]
    pub base_score: Option<f64>,
    #[serde(default, rename = "baseSeverity")]
    pub base_severity: Option<String>,
    #[serde(default, rename = "vectorString")]
    pub vector_string: Option<String>,
}

/// CVSS fields picked out of one NVD response. Everything stays `None`
/// when no preferred metric family is present, which includes CVEs still
/// awaiting NVD analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NvdDetail {
    pub cvss: Option<f64>,
    pub cvss_version: Option<String>,
    pub severity: Option<String>,
    pub vector: Option<String>,
    pub kev_eligible: bool,
}

/// Metric families in preference order for the configured CVSS major
/// version.
pub fn metric_preference(cvss_version: u8) -> &'static [&'static str] {
    if cvss_version == 4 {
        &["cvssMetricV40", "cvssMetricV31", "cvssMetricV30", "cvssMetricV2"]
    } else {
        &["cvssMetricV31", "cvssMetricV30", "cvssMetricV2"]
    }
}

/// Pick the first preferred metric family out of a response. KEV
/// eligibility is only reported alongside a resolved metric; a CVE with
/// no usable metrics degrades to all-unknown.
pub fn extract_detail(response: &NvdResponse, cvss_version: u8) -> NvdDetail {
    let Some(vuln) = response.vulnerabilities.first() else {
        return NvdDetail::default();
    };
    let kev_eligible = vuln.cve.cisa_exploit_add.is_some();
    for family in metric_preference(cvss_version) {
        if let Some(metric) = vuln.cve.metrics.get(*family).and_then(|m| m.first()) {
            return NvdDetail {
                cvss: Some(metric.cvss_data.base_score.unwrap_or(0.0)),
                cvss_version: Some(family.replace("cvssMetric", "CVSS ")),
                severity: metric.cvss_data.base_severity.clone(),
                vector: metric.cvss_data.vector_string.clone(),
                kev_eligible,
            };
        }
    }
    NvdDetail::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> NvdResponse {
        serde_json::from_str(body).unwrap()
    }

    const WITH_V31_AND_V2: &str = r#"{
        "totalResults": 1,
        "vulnerabilities": [{
            "cve": {
                "vulnStatus": "Analyzed",
                "cisaExploitAdd": "2021-11-03",
                "metrics": {
                    "cvssMetricV2": [{"cvssData": {"baseScore": 10.0, "vectorString": "AV:N/AC:L/Au:N/C:C/I:C/A:C"}}],
                    "cvssMetricV31": [{"cvssData": {"baseScore": 9.8, "baseSeverity": "CRITICAL", "vectorString": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H"}}]
                }
            }
        }]
    }"#;

    #[test]
    fn prefers_v31_over_v2() {
        let detail = extract_detail(&response(WITH_V31_AND_V2), 3);
        assert_eq!(detail.cvss, Some(9.8));
        assert_eq!(detail.cvss_version.as_deref(), Some("CVSS V31"));
        assert_eq!(detail.severity.as_deref(), Some("CRITICAL"));
        assert!(detail.kev_eligible);
    }

    #[test]
    fn version_four_preference_takes_v40_first() {
        let body = r#"{
            "totalResults": 1,
            "vulnerabilities": [{
                "cve": {
                    "metrics": {
                        "cvssMetricV40": [{"cvssData": {"baseScore": 7.3, "baseSeverity": "HIGH"}}],
                        "cvssMetricV31": [{"cvssData": {"baseScore": 9.8, "baseSeverity": "CRITICAL"}}]
                    }
                }
            }]
        }"#;
        let detail = extract_detail(&response(body), 4);
        assert_eq!(detail.cvss, Some(7.3));
        assert_eq!(detail.cvss_version.as_deref(), Some("CVSS V40"));

        // the same response under version 3 preference ignores V40
        let detail = extract_detail(&response(body), 3);
        assert_eq!(detail.cvss, Some(9.8));
    }

    #[test]
    fn awaiting_analysis_degrades_to_unknown() {
        let body = r#"{
            "totalResults": 1,
            "vulnerabilities": [{
                "cve": {"vulnStatus": "Awaiting Analysis", "metrics": {}}
            }]
        }"#;
        let detail = extract_detail(&response(body), 3);
        assert_eq!(detail, NvdDetail::default());
        assert!(!detail.kev_eligible);
    }

    #[test]
    fn missing_base_score_defaults_to_zero() {
        let body = r#"{
            "totalResults": 1,
            "vulnerabilities": [{
                "cve": {"metrics": {"cvssMetricV30": [{"cvssData": {"baseSeverity": "LOW"}}]}}
            }]
        }"#;
        let detail = extract_detail(&response(body), 3);
        assert_eq!(detail.cvss, Some(0.0));
        assert_eq!(detail.cvss_version.as_deref(), Some("CVSS V30"));
    }

    #[test]
    fn empty_response_is_all_unknown() {
        let detail = extract_detail(&response(r#"{"totalResults": 0}"#), 3);
        assert_eq!(detail, NvdDetail::default());
    }
}
