//! Integration tests for the storage engine and query modules.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use vigil_core::types::{
    AssessmentKind, CveRecord, Finding, FindingName, FindingStatus, PluginSpec, Priority,
    PriorityResult, Product, Severity,
};
use vigil_store::queries::{cve_ops, finding_name_ops, finding_ops, revert_ops};
use vigil_store::queries::finding_ops::UpsertOutcome;
use vigil_store::StoreEngine;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_catalog(engine: &StoreEngine) -> (Uuid, Uuid, Uuid) {
    let product = Product {
        id: Uuid::new_v4(),
        name: "billing".to_string(),
        created_at: Utc::now(),
    };
    let plugin = PluginSpec {
        id: Uuid::new_v4(),
        name: "nessus".to_string(),
        kind: AssessmentKind::Va,
        created_at: Utc::now(),
    };
    engine.create_product(&product).unwrap();
    engine.create_plugin(&plugin).unwrap();

    let finding_name = FindingName {
        id: Uuid::new_v4(),
        name: "Weak SSH MAC".to_string(),
        description: Some("first description".to_string()),
        product_id: product.id,
        created_at: Utc::now(),
    };
    engine
        .with_writer(|conn| finding_name_ops::insert_ignore(conn, &finding_name))
        .unwrap();
    (product.id, plugin.id, finding_name.id)
}

fn make_finding(
    finding_name_id: Uuid,
    product_id: Uuid,
    plugin_id: Uuid,
    host: &str,
    port: i64,
    day: NaiveDate,
) -> Finding {
    Finding {
        id: Uuid::new_v4(),
        finding_name_id,
        product_id,
        plugin_id,
        host: host.to_string(),
        port,
        status: FindingStatus::New,
        severity: Severity::High,
        reopen: false,
        vpr_score: None,
        evidence: String::new(),
        remediation: String::new(),
        remark: None,
        internal_remark: None,
        finding_date: day,
        last_update: day,
        closed_at: None,
        closing_effort: None,
        delay_untill: None,
        label: None,
        created_at: Utc::now(),
    }
}

#[test]
fn migrations_are_idempotent_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");
    {
        let engine = StoreEngine::open(&path).unwrap();
        let (product_id, _, _) = make_catalog(&engine);
        assert!(engine.get_product(product_id).unwrap().is_some());
    }
    // second open re-runs the migration chain against existing tables
    let engine = StoreEngine::open(&path).unwrap();
    assert_eq!(engine.list_products().unwrap().len(), 1);
}

#[test]
fn catalog_round_trip() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, _) = make_catalog(&engine);

    let product = engine.get_product(product_id).unwrap().unwrap();
    assert_eq!(product.name, "billing");
    let plugin = engine.get_plugin(plugin_id).unwrap().unwrap();
    assert_eq!(plugin.kind, AssessmentKind::Va);
    assert!(engine.get_plugin(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn finding_name_keeps_first_description() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, _, _) = make_catalog(&engine);

    let duplicate = FindingName {
        id: Uuid::new_v4(),
        name: "Weak SSH MAC".to_string(),
        description: Some("second description".to_string()),
        product_id,
        created_at: Utc::now(),
    };
    let inserted = engine
        .with_writer(|conn| finding_name_ops::insert_ignore(conn, &duplicate))
        .unwrap();
    assert!(!inserted);

    let stored = engine
        .with_writer(|conn| finding_name_ops::get_by_name(conn, product_id, "Weak SSH MAC"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.description.as_deref(), Some("first description"));
}

#[test]
fn upsert_discriminates_created_from_updated() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);
    let d2 = date(2024, 1, 8);

    let first = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    let outcome = engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &first, AssessmentKind::Va))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Created);

    // same occurrence a week later: conflict update, not a new row
    let mut second = make_finding(name_id, product_id, plugin_id, "web-1", 22, d2);
    second.evidence = "still present".to_string();
    let outcome = engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &second, AssessmentKind::Va))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let rows = engine.findings_for_product(product_id).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, first.id);
    assert_eq!(row.status, FindingStatus::Open);
    assert_eq!(row.finding_date, d1);
    assert_eq!(row.last_update, d2);
    assert_eq!(row.evidence, "still present");
    assert_eq!(row.label, None);
}

#[test]
fn ha_upsert_takes_incoming_status() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, _, name_id) = make_catalog(&engine);
    let ha_plugin = PluginSpec {
        id: Uuid::new_v4(),
        name: "aws".to_string(),
        kind: AssessmentKind::Ha,
        created_at: Utc::now(),
    };
    engine.create_plugin(&ha_plugin).unwrap();

    let mut first = make_finding(name_id, product_id, ha_plugin.id, "acct-1", 0, date(2024, 1, 1));
    first.status = FindingStatus::Failed;
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &first, AssessmentKind::Ha))
        .unwrap();

    let mut second = make_finding(name_id, product_id, ha_plugin.id, "acct-1", 0, date(2024, 1, 8));
    second.status = FindingStatus::Warning;
    let outcome = engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &second, AssessmentKind::Ha))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let rows = engine.findings_for_product(product_id).unwrap();
    assert_eq!(rows[0].status, FindingStatus::Warning);
}

#[test]
fn close_sweep_stamps_effort_in_days() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);
    let d2 = date(2024, 1, 8);

    let finding = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &finding, AssessmentKind::Va))
        .unwrap();

    let closed = engine
        .with_writer(|conn| {
            finding_ops::close_sweep(conn, product_id, plugin_id, d2, AssessmentKind::Va)
        })
        .unwrap();
    assert_eq!(closed, 1);

    let row = &engine.findings_for_product(product_id).unwrap()[0];
    assert_eq!(row.status, FindingStatus::Closed);
    assert_eq!(row.closed_at, Some(d2));
    assert_eq!(row.last_update, d2);
    assert_eq!(row.closing_effort, Some(7));

    // already terminal: a later sweep leaves it alone
    let closed = engine
        .with_writer(|conn| {
            finding_ops::close_sweep(conn, product_id, plugin_id, date(2024, 1, 15), AssessmentKind::Va)
        })
        .unwrap();
    assert_eq!(closed, 0);
}

#[test]
fn closed_row_does_not_block_reinsert() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);
    let d2 = date(2024, 1, 8);
    let d3 = date(2024, 1, 15);

    let first = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &first, AssessmentKind::Va))
        .unwrap();
    engine
        .with_writer(|conn| {
            finding_ops::close_sweep(conn, product_id, plugin_id, d2, AssessmentKind::Va)
        })
        .unwrap();

    // reappearance after closure: fresh row, not an update
    let third = make_finding(name_id, product_id, plugin_id, "web-1", 22, d3);
    let outcome = engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &third, AssessmentKind::Va))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Created);
    assert_eq!(engine.findings_for_product(product_id).unwrap().len(), 2);
}

#[test]
fn reopen_sweep_flags_earliest_closed_row_once() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);
    let d2 = date(2024, 1, 8);
    let d3 = date(2024, 1, 15);

    let first = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &first, AssessmentKind::Va))
        .unwrap();
    engine
        .with_writer(|conn| {
            finding_ops::close_sweep(conn, product_id, plugin_id, d2, AssessmentKind::Va)
        })
        .unwrap();
    let reintroduced = make_finding(name_id, product_id, plugin_id, "web-1", 22, d3);
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &reintroduced, AssessmentKind::Va))
        .unwrap();

    let reopened = engine
        .with_writer(|conn| finding_ops::reopen_sweep(conn, product_id, plugin_id))
        .unwrap();
    assert_eq!(reopened, 1);

    let rows = engine.findings_for_product(product_id).unwrap();
    let closed_row = rows.iter().find(|f| f.status == FindingStatus::Closed).unwrap();
    let live_row = rows.iter().find(|f| f.status == FindingStatus::New).unwrap();
    assert!(closed_row.reopen);
    assert_eq!(
        live_row.internal_remark.as_deref(),
        Some("The finding is reopened on 2024-01-15 after first discovered on 2024-01-01")
    );

    // a second sweep finds nothing new to flag
    let reopened = engine
        .with_writer(|conn| finding_ops::reopen_sweep(conn, product_id, plugin_id))
        .unwrap();
    assert_eq!(reopened, 0);
}

#[test]
fn first_seen_correction_resets_same_day_rows() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);

    let mut finding = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    finding.status = FindingStatus::Open;
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &finding, AssessmentKind::Va))
        .unwrap();

    let corrected = engine
        .with_writer(|conn| finding_ops::first_seen_correction(conn, product_id, plugin_id))
        .unwrap();
    assert_eq!(corrected, 1);
    let row = &engine.findings_for_product(product_id).unwrap()[0];
    assert_eq!(row.status, FindingStatus::New);
}

#[test]
fn known_triples_and_max_last_update() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);

    let finding = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &finding, AssessmentKind::Va))
        .unwrap();

    let triples = engine
        .with_writer(|conn| finding_ops::known_triples(conn, product_id))
        .unwrap();
    assert!(triples.contains(&("web-1".to_string(), 22, "Weak SSH MAC".to_string())));

    let max = engine
        .with_writer(|conn| finding_ops::max_last_update(conn, product_id, plugin_id))
        .unwrap();
    assert_eq!(max, Some(d1));
    let none = engine
        .with_writer(|conn| finding_ops::max_last_update(conn, product_id, Uuid::new_v4()))
        .unwrap();
    assert_eq!(none, None);
}

#[test]
fn snapshot_restore_round_trip() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let d1 = date(2024, 1, 1);

    let keep = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    let lose = make_finding(name_id, product_id, plugin_id, "web-2", 22, d1);
    engine
        .with_writer(|conn| {
            finding_ops::upsert_finding(conn, &keep, AssessmentKind::Va)?;
            finding_ops::upsert_finding(conn, &lose, AssessmentKind::Va)?;
            Ok(())
        })
        .unwrap();

    let captured = engine
        .with_writer(|conn| revert_ops::snapshot_product(conn, product_id))
        .unwrap();
    assert_eq!(captured, 2);

    // mutate the live set: drop one row, add another
    engine
        .with_writer(|conn| finding_ops::delete_findings(conn, product_id, Some("web-2")))
        .unwrap();
    let added = make_finding(name_id, product_id, plugin_id, "web-3", 22, date(2024, 1, 8));
    engine
        .with_writer(|conn| finding_ops::upsert_finding(conn, &added, AssessmentKind::Va))
        .unwrap();

    let restored = engine
        .with_writer(|conn| revert_ops::restore_product(conn, product_id))
        .unwrap();
    assert_eq!(restored, 2);

    let rows = engine.findings_for_product(product_id).unwrap();
    let ids: Vec<Uuid> = rows.iter().map(|f| f.id).collect();
    assert!(ids.contains(&keep.id));
    assert!(ids.contains(&lose.id));
    assert!(!ids.contains(&added.id));

    // snapshot consumed
    let has = engine
        .with_writer(|conn| revert_ops::has_snapshot(conn, product_id))
        .unwrap();
    assert!(!has);
}

#[test]
fn delete_same_day_is_product_scoped() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, plugin_id, name_id) = make_catalog(&engine);
    let other_product = Product {
        id: Uuid::new_v4(),
        name: "payments".to_string(),
        created_at: Utc::now(),
    };
    engine.create_product(&other_product).unwrap();
    let other_name = FindingName {
        id: Uuid::new_v4(),
        name: "Weak SSH MAC".to_string(),
        description: None,
        product_id: other_product.id,
        created_at: Utc::now(),
    };
    engine
        .with_writer(|conn| finding_name_ops::insert_ignore(conn, &other_name))
        .unwrap();

    let d1 = date(2024, 1, 1);
    let mine = make_finding(name_id, product_id, plugin_id, "web-1", 22, d1);
    let theirs = make_finding(other_name.id, other_product.id, plugin_id, "web-9", 22, d1);
    engine
        .with_writer(|conn| {
            finding_ops::upsert_finding(conn, &mine, AssessmentKind::Va)?;
            finding_ops::upsert_finding(conn, &theirs, AssessmentKind::Va)?;
            Ok(())
        })
        .unwrap();

    let deleted = engine
        .with_writer(|conn| finding_ops::delete_same_day(conn, product_id, d1))
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(engine.findings_for_product(product_id).unwrap().len(), 0);
    assert_eq!(
        engine.findings_for_product(other_product.id).unwrap().len(),
        1
    );
}

#[test]
fn cve_insert_ignore_and_priority_write_back() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let (product_id, _, name_id) = make_catalog(&engine);
    let _ = product_id;

    let cve = CveRecord {
        id: Uuid::new_v4(),
        name: "CVE-2024-12345".to_string(),
        finding_name_id: Some(name_id),
        severity: Severity::High,
        priority: None,
        epss: None,
        cvss: None,
        cvss_version: None,
        kev_list: false,
        vector: None,
        created_at: Utc::now(),
    };
    let inserted = engine
        .with_writer(|conn| cve_ops::insert_ignore(conn, &cve))
        .unwrap();
    assert!(inserted);
    let again = engine
        .with_writer(|conn| cve_ops::insert_ignore(conn, &cve))
        .unwrap();
    assert!(!again);

    assert_eq!(engine.unscored_cves().unwrap(), vec!["CVE-2024-12345"]);

    let result = PriorityResult {
        cve_id: "CVE-2024-12345".to_string(),
        priority: Priority::One,
        epss: Some(0.25),
        cvss: Some(7.5),
        cvss_version: Some("3.1".to_string()),
        severity: Some("HIGH".to_string()),
        vector: Some("CVSS:3.1/AV:N/AC:L".to_string()),
        kev_list: false,
    };
    let updated = engine.apply_priorities(&[result]).unwrap();
    assert_eq!(updated, 1);

    let stored = engine.cve_by_name("CVE-2024-12345").unwrap().unwrap();
    assert_eq!(stored.priority, Some(Priority::One));
    assert_eq!(stored.cvss, Some(7.5));
    assert_eq!(stored.epss, Some(0.25));
    assert!(engine.unscored_cves().unwrap().is_empty());
}
