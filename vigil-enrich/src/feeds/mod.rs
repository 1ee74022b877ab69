//! HTTP clients for the three enrichment feeds.
//!
//! Every fetch returns an `EnrichError` on failure; callers degrade the
//! affected CVE to unknown scores instead of failing the batch.

pub mod epss;
pub mod kev;
pub mod nvd;

use std::time::Duration;

use vigil_core::config::EnrichmentConfig;
use vigil_core::errors::{EnrichError, VigilResult};
use vigil_core::VigilError;

pub use epss::EpssScore;
pub use kev::KevCatalog;
pub use nvd::NvdDetail;

pub struct FeedClient {
    http: reqwest::Client,
    config: EnrichmentConfig,
}

impl FeedClient {
    pub fn new(config: EnrichmentConfig) -> VigilResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| VigilError::Config {
                reason: format!("enrichment http client: {e}"),
            })?;
        Ok(FeedClient { http, config })
    }

    /// Fetch CVSS detail and KEV eligibility for one CVE from NVD.
    pub async fn nvd_detail(&self, cve_id: &str) -> Result<NvdDetail, EnrichError> {
        let url = format!("{}?cveId={}", self.config.nvd_url, cve_id);
        let body: nvd::NvdResponse = self.get_json("nvd", cve_id, &url).await?;

        if body.vulnerabilities.is_empty() {
            tracing::warn!(cve = %cve_id, "not found in NVD");
            return Ok(NvdDetail::default());
        }
        let detail = nvd::extract_detail(&body, self.config.cvss_version);
        if detail.cvss.is_none() {
            let status = body
                .vulnerabilities
                .first()
                .and_then(|v| v.cve.vuln_status.as_deref());
            if status == Some("Awaiting Analysis") {
                tracing::info!(cve = %cve_id, "awaiting NVD analysis");
            }
        }
        Ok(detail)
    }

    /// Fetch the exploitation probability for one CVE from FIRST.org.
    pub async fn epss_score(&self, cve_id: &str) -> Result<EpssScore, EnrichError> {
        let url = format!("{}?cve={}", self.config.epss_url, cve_id);
        let body: epss::EpssResponse = self.get_json("epss", cve_id, &url).await?;
        if body.data.is_empty() {
            tracing::warn!(cve = %cve_id, "not found in EPSS");
        }
        Ok(epss::extract_score(&body))
    }

    /// Fetch the full KEV catalog.
    pub async fn kev_catalog(&self) -> Result<KevCatalog, EnrichError> {
        let url = self.config.kev_url.clone();
        self.get_json("kev", "catalog", &url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        feed: &str,
        cve_id: &str,
        url: &str,
    ) -> Result<T, EnrichError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EnrichError::RequestFailed {
                feed: feed.to_string(),
                cve: cve_id.to_string(),
                reason: e.to_string(),
            })?;
        response.json().await.map_err(|e| EnrichError::MalformedResponse {
            feed: feed.to_string(),
            cve: cve_id.to_string(),
            reason: e.to_string(),
        })
    }
}
