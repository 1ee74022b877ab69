//! Default values for configuration fields.

pub const DEFAULT_DB_PATH: &str = "vigil.db";

/// CVSS score at or above which a CVE counts as high impact.
pub const DEFAULT_CVSS_THRESHOLD: f64 = 6.0;

/// EPSS probability at or above which exploitation counts as likely.
pub const DEFAULT_EPSS_THRESHOLD: f64 = 0.2;

/// Preferred CVSS metric major version.
pub const DEFAULT_CVSS_VERSION: u8 = 3;

/// CVEs scored per chunk before the bulk write-back.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// NVD public rate limit: requests per rolling window.
pub const DEFAULT_NVD_MAX_REQUESTS: usize = 5;

/// NVD rate limit window, in seconds.
pub const DEFAULT_NVD_WINDOW_SECS: u64 = 30;

/// Per-request HTTP timeout, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

pub const DEFAULT_NVD_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

pub const DEFAULT_EPSS_URL: &str = "https://api.first.org/data/v1/epss";

pub const DEFAULT_KEV_URL: &str =
    "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json";
