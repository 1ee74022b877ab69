//! # vigil-enrich
//!
//! CVE enrichment for the Vigil finding tracker: NVD, EPSS, and CISA KEV
//! lookups under a rolling-window rate limit, a priority decision table,
//! and a chunked job that writes scores back to the store.

pub mod enricher;
pub mod feeds;
pub mod rate_limit;
pub mod scorer;

pub use enricher::Enricher;
pub use rate_limit::RollingWindowLimiter;
pub use scorer::PriorityScorer;
