//! Enrichment job behavior that is observable without live feeds.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use vigil_core::config::EnrichmentConfig;
use vigil_core::types::{CveRecord, Priority, Severity};
use vigil_enrich::Enricher;
use vigil_store::queries::cve_ops;
use vigil_store::StoreEngine;

fn make_enricher() -> Enricher {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    Enricher::new(store, EnrichmentConfig::default()).unwrap()
}

fn register_cve(store: &StoreEngine, name: &str) {
    let cve = CveRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        finding_name_id: None,
        severity: Severity::Medium,
        priority: None,
        epss: None,
        cvss: None,
        cvss_version: None,
        kev_list: false,
        vector: None,
        created_at: Utc::now(),
    };
    store
        .with_writer(|conn| cve_ops::insert_ignore(conn, &cve))
        .unwrap();
}

#[tokio::test]
async fn invalid_identifiers_are_skipped_before_any_lookup() {
    let enricher = make_enricher();
    let results = enricher
        .enrich_and_score(&[
            "not-a-cve".to_string(),
            "GHSA-q2x7-8rv6-6q7h".to_string(),
            "cve-2024-1111".to_string(),
            "CVE-2024-111".to_string(),
        ])
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn run_pending_is_a_no_op_when_nothing_is_unscored() {
    let enricher = make_enricher();
    assert_eq!(enricher.run_pending().await.unwrap(), 0);
}

#[tokio::test]
async fn unreachable_feeds_degrade_every_pending_cve_to_lowest_priority() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let names = ["CVE-2024-0001", "CVE-2024-0002", "CVE-2024-0003"];
    for name in names {
        register_cve(&store, name);
    }

    // nothing listens on port 1, so every request is refused immediately
    let config = EnrichmentConfig {
        nvd_url: "http://127.0.0.1:1/nvd".to_string(),
        epss_url: "http://127.0.0.1:1/epss".to_string(),
        kev_url: "http://127.0.0.1:1/kev".to_string(),
        chunk_size: 2,
        ..EnrichmentConfig::default()
    };
    let enricher = Enricher::new(Arc::clone(&store), config).unwrap();

    assert_eq!(enricher.run_pending().await.unwrap(), 3);
    for name in names {
        let stored = store.cve_by_name(name).unwrap().unwrap();
        assert_eq!(stored.priority, Some(Priority::Four));
        assert_eq!(stored.cvss, None);
        assert_eq!(stored.epss, None);
        assert!(!stored.kev_list);
        // ingestion-derived severity survives a failed NVD lookup
        assert_eq!(stored.severity, Severity::Medium);
    }

    // everything scored, the next run has nothing to drain
    assert_eq!(enricher.run_pending().await.unwrap(), 0);
}
