//! The chunked enrichment job.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::sync::Mutex;

use vigil_core::config::EnrichmentConfig;
use vigil_core::constants::CVE_ID_PATTERN;
use vigil_core::errors::VigilResult;
use vigil_core::types::PriorityResult;
use vigil_store::StoreEngine;

use crate::feeds::{EpssScore, FeedClient, KevCatalog, NvdDetail};
use crate::rate_limit::RollingWindowLimiter;
use crate::scorer::PriorityScorer;

static CVE_ID_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!("^{CVE_ID_PATTERN}$")).ok());

fn is_cve_id(name: &str) -> bool {
    CVE_ID_RE
        .as_ref()
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Scores CVEs against the three external feeds and writes priorities
/// back to the store in chunks.
///
/// Feed failures degrade the affected CVE to unknown scores; only store
/// failures abort a run.
pub struct Enricher {
    store: Arc<StoreEngine>,
    feeds: FeedClient,
    scorer: PriorityScorer,
    limiter: Mutex<RollingWindowLimiter>,
    chunk_size: usize,
}

impl Enricher {
    pub fn new(store: Arc<StoreEngine>, config: EnrichmentConfig) -> VigilResult<Self> {
        let scorer = PriorityScorer::new(config.cvss_threshold, config.epss_threshold);
        let limiter = Mutex::new(RollingWindowLimiter::new(
            config.nvd_max_requests,
            Duration::from_secs(config.nvd_window_secs),
        ));
        let chunk_size = config.chunk_size.max(1);
        let feeds = FeedClient::new(config)?;
        Ok(Enricher {
            store,
            feeds,
            scorer,
            limiter,
            chunk_size,
        })
    }

    /// Score the given CVE identifiers. Identifiers that are not CVE ids
    /// are skipped before any network call.
    pub async fn enrich_and_score(&self, cve_names: &[String]) -> Vec<PriorityResult> {
        let mut results = Vec::with_capacity(cve_names.len());
        // one catalog fetch per run, attempted at most once
        let mut kev_catalog: Option<KevCatalog> = None;
        let mut kev_fetch_attempted = false;

        for cve_id in cve_names {
            if !is_cve_id(cve_id) {
                tracing::warn!(cve = %cve_id, "skipping invalid CVE identifier");
                continue;
            }

            self.nvd_permit().await;
            tracing::debug!(cve = %cve_id, "enriching");
            let detail = match self.feeds.nvd_detail(cve_id).await {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::warn!(cve = %cve_id, error = %e, "NVD lookup failed");
                    NvdDetail::default()
                }
            };

            if detail.kev_eligible {
                if !kev_fetch_attempted {
                    kev_fetch_attempted = true;
                    match self.feeds.kev_catalog().await {
                        Ok(catalog) => kev_catalog = Some(catalog),
                        Err(e) => {
                            tracing::warn!(error = %e, "KEV catalog fetch failed");
                        }
                    }
                }
                if let Some(ransomware) = kev_catalog
                    .as_ref()
                    .and_then(|catalog| catalog.ransomware_use(cve_id))
                {
                    tracing::info!(
                        cve = %cve_id,
                        ransomware = %ransomware,
                        "listed in the CISA KEV catalog"
                    );
                }
            }

            let epss = match self.feeds.epss_score(cve_id).await {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!(cve = %cve_id, error = %e, "EPSS lookup failed");
                    EpssScore::default()
                }
            };

            results.push(self.scorer.score(cve_id, &detail, &epss));
        }
        results
    }

    /// Drain every CVE still lacking a priority: fetch, score, and bulk
    /// write-back one chunk at a time.
    pub async fn run_pending(&self) -> VigilResult<usize> {
        let pending = self.store.unscored_cves()?;
        if pending.is_empty() {
            return Ok(0);
        }
        tracing::info!(pending = pending.len(), "starting enrichment run");

        let mut written = 0;
        for chunk in pending.chunks(self.chunk_size) {
            let results = self.enrich_and_score(chunk).await;
            written += self.store.apply_priorities(&results)?;
        }
        tracing::info!(scored = written, "enrichment run complete");
        Ok(written)
    }

    async fn nvd_permit(&self) {
        loop {
            let wait = {
                let mut limiter = self.limiter.lock().await;
                match limiter.try_acquire_at(Instant::now()) {
                    Ok(()) => None,
                    Err(wait) => Some(wait),
                }
            };
            match wait {
                None => return,
                Some(wait) => tokio::time::sleep(wait).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cve_id_gate_is_anchored() {
        assert!(is_cve_id("CVE-2024-1111"));
        assert!(is_cve_id("CVE-2021-4428812"));
        assert!(!is_cve_id("cve-2024-1111"));
        assert!(!is_cve_id("CVE-2024-111"));
        assert!(!is_cve_id("CVE-2024-1111 and friends"));
        assert!(!is_cve_id("GHSA-xxxx-yyyy"));
    }
}
