//! FIRST.org EPSS API response shapes.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EpssResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub data: Vec<EpssEntry>,
}

/// The feed serializes its floats as strings.
#[derive(Debug, Deserialize)]
pub struct EpssEntry {
    pub cve: String,
    pub epss: String,
    pub percentile: String,
}

/// Exploitation probability for one CVE. `percentile` is scaled to a
/// whole-number percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpssScore {
    pub epss: Option<f64>,
    pub percentile: Option<i64>,
}

pub fn extract_score(response: &EpssResponse) -> EpssScore {
    let Some(entry) = response.data.first() else {
        return EpssScore::default();
    };
    EpssScore {
        epss: entry.epss.trim().parse().ok(),
        percentile: entry
            .percentile
            .trim()
            .parse::<f64>()
            .ok()
            .map(|p| (p * 100.0) as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_floats_and_scales_percentile() {
        let response: EpssResponse = serde_json::from_str(
            r#"{"total": 1, "data": [{"cve": "CVE-2024-1111", "epss": "0.97231", "percentile": "0.99876"}]}"#,
        )
        .unwrap();
        let score = extract_score(&response);
        assert_eq!(score.epss, Some(0.97231));
        assert_eq!(score.percentile, Some(99));
    }

    #[test]
    fn unknown_cve_yields_no_score() {
        let response: EpssResponse =
            serde_json::from_str(r#"{"total": 0, "data": []}"#).unwrap();
        assert_eq!(extract_score(&response), EpssScore::default());
    }

    #[test]
    fn garbage_floats_degrade_to_none() {
        let response: EpssResponse = serde_json::from_str(
            r#"{"total": 1, "data": [{"cve": "CVE-2024-1111", "epss": "n/a", "percentile": ""}]}"#,
        )
        .unwrap();
        let score = extract_score(&response);
        assert_eq!(score.epss, None);
        assert_eq!(score.percentile, None);
    }
}
