use serde::{Deserialize, Serialize};

use super::defaults;

/// Enrichment job configuration: scoring thresholds, feed endpoints, and
/// request pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// CVSS score at or above which a CVE counts as high impact.
    pub cvss_threshold: f64,
    /// EPSS probability at or above which exploitation counts as likely.
    pub epss_threshold: f64,
    /// Preferred CVSS metric major version (3 or 4).
    pub cvss_version: u8,
    /// CVEs scored per chunk before the bulk write-back.
    pub chunk_size: usize,
    /// NVD rate limit: max requests per rolling window.
    pub nvd_max_requests: usize,
    /// NVD rate limit window in seconds.
    pub nvd_window_secs: u64,
    /// Per-request HTTP timeout in seconds.
    pub http_timeout_secs: u64,
    pub nvd_url: String,
    pub epss_url: String,
    pub kev_url: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            cvss_threshold: defaults::DEFAULT_CVSS_THRESHOLD,
            epss_threshold: defaults::DEFAULT_EPSS_THRESHOLD,
            cvss_version: defaults::DEFAULT_CVSS_VERSION,
            chunk_size: defaults::DEFAULT_CHUNK_SIZE,
            nvd_max_requests: defaults::DEFAULT_NVD_MAX_REQUESTS,
            nvd_window_secs: defaults::DEFAULT_NVD_WINDOW_SECS,
            http_timeout_secs: defaults::DEFAULT_HTTP_TIMEOUT_SECS,
            nvd_url: defaults::DEFAULT_NVD_URL.to_string(),
            epss_url: defaults::DEFAULT_EPSS_URL.to_string(),
            kev_url: defaults::DEFAULT_KEV_URL.to_string(),
        }
    }
}
