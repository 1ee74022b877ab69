/// Per-CVE enrichment failures. Logged and degraded to unknown scores,
/// never fatal to the surrounding batch.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("{feed} request for {cve} failed: {reason}")]
    RequestFailed {
        feed: String,
        cve: String,
        reason: String,
    },

    #[error("{feed} returned an unexpected payload for {cve}: {reason}")]
    MalformedResponse {
        feed: String,
        cve: String,
        reason: String,
    },

    #[error("{name} is not a valid CVE identifier")]
    InvalidCveId { name: String },
}
