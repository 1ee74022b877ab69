//! Integration tests for the Nessus-family normalizer plugins.

use vigil_core::types::AssessmentKind;
use vigil_normalize::builtin::{CloudNessus, ManualCsv, Nessus};
use vigil_normalize::{canonical_records, validate_schema, Normalizer, Value};

fn make_nessus_export() -> Vec<u8> {
    let mut csv = String::new();
    csv.push_str(
        "Plugin ID,CVE,Risk,Host,Protocol,Port,Name,Description,Solution,Plugin Output,VPR Score\n",
    );
    // informational row, dropped by the risk filter
    csv.push_str("10180,,None,web-1,icmp,0,Ping the remote host,The host replies to ping.,n/a,reply received,\n");
    csv.push_str("51192,CVE-2021-3449,Medium,web-1,tcp,443,SSL Certificate Cannot Be Trusted,\"The chain is broken.\nIntermediate missing.\",Purchase or generate a proper certificate.,\"cert CN=web-1\nexpired 2020\",6.1\n");
    csv.into_bytes()
}

#[test]
fn nessus_export_maps_to_canonical_schema() {
    let table = Nessus.process(&make_nessus_export()).unwrap();
    validate_schema(&table, AssessmentKind::Va).unwrap();

    assert_eq!(table.n_rows(), 1);
    assert_eq!(
        table.value(0, "cve"),
        Some(&Value::Text("CVE-2021-3449".into()))
    );
    assert_eq!(table.value(0, "port"), Some(&Value::Int(443)));
    assert_eq!(
        table.value(0, "remediation"),
        Some(&Value::Text("Purchase or generate a proper certificate.".into()))
    );
    assert_eq!(
        table.value(0, "evidence"),
        Some(&Value::Text("cert CN=web-1 <br/> expired 2020".into()))
    );
    assert_eq!(
        table.value(0, "description"),
        Some(&Value::Text(
            "The chain is broken. <br/> Intermediate missing.".into()
        ))
    );
}

#[test]
fn nessus_records_convert_cleanly() {
    let table = Nessus.process(&make_nessus_export()).unwrap();
    let records = canonical_records(&table, AssessmentKind::Va).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.cve.as_deref(), Some("CVE-2021-3449"));
    assert_eq!(record.risk.as_deref(), Some("Medium"));
    assert_eq!(record.host, "web-1");
    assert_eq!(record.port, 443);
    assert_eq!(record.name, "SSL Certificate Cannot Be Trusted");
    assert_eq!(record.vpr_score.as_deref(), Some("6.1"));
    assert_eq!(record.status, None);
}

#[test]
fn cloud_nessus_collapses_hosts() {
    let mut csv = String::new();
    csv.push_str("CVE,Risk,Host,Port,Name,Description,Solution,Plugin Output,VPR Score\n");
    csv.push_str(",High,10.0.0.1,22,Weak SSH MAC,desc,Disable weak MACs.,out-a,\n");
    csv.push_str(",High,10.0.0.2,22,Weak SSH MAC,desc,Disable weak MACs.,out-b,\n");
    csv.push_str(",Low,10.0.0.2,80,HTTP TRACE enabled,other,Disable TRACE.,out-c,\n");

    let table = CloudNessus.process(csv.as_bytes()).unwrap();
    validate_schema(&table, AssessmentKind::Va).unwrap();

    // duplicate (name, description, remediation) rows collapse to the first
    assert_eq!(table.n_rows(), 2);
    for row in 0..table.n_rows() {
        assert_eq!(
            table.value(row, "host"),
            Some(&Value::Text("Cloud_Assets".into()))
        );
        assert_eq!(table.value(row, "port"), Some(&Value::Int(0)));
    }
    assert_eq!(table.value(0, "evidence"), Some(&Value::Text("out-a".into())));
}

#[test]
fn manual_csv_is_passthrough() {
    let csv = "cve,risk,host,port,name,description,remediation,evidence,vpr_score\n\
               CVE-2024-0001,Critical,db-1,5432,Outdated PostgreSQL,desc,Upgrade.,evid,9.2\n";
    let table = ManualCsv.process(csv.as_bytes()).unwrap();
    validate_schema(&table, AssessmentKind::Va).unwrap();
    assert_eq!(table.value(0, "port"), Some(&Value::Int(5432)));
    assert_eq!(
        table.value(0, "cve"),
        Some(&Value::Text("CVE-2024-0001".into()))
    );
}

#[test]
fn manual_csv_rejects_unparseable_port() {
    let csv = "cve,risk,host,port,name,description,remediation,evidence,vpr_score\n\
               ,High,db-1,tcp,Bad row,,,,\n";
    assert!(ManualCsv.process(csv.as_bytes()).is_err());
}
