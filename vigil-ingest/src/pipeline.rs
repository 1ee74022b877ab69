//! Pure row transforms between canonical records and storable rows.
//!
//! Everything here is side-effect free so the reconciliation steps can
//! be exercised without a database.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use vigil_core::errors::{ValidationError, VigilResult};
use vigil_core::types::{
    AssessmentKind, CanonicalRecord, CveRecord, Finding, FindingName, FindingStatus, Severity,
    UploadContext,
};

/// HA exports wrap check names in double quotes; strip them before the
/// identity grouping so quoted and bare spellings join to one name.
pub fn prenormalize_ha(records: &mut [CanonicalRecord]) {
    for record in records.iter_mut() {
        if record.name.contains('"') {
            record.name = record.name.replace('"', "");
        }
    }
}

/// Drop rows whose (host, port, name) triple the product has never seen.
pub fn retain_known(records: &mut Vec<CanonicalRecord>, known: &HashSet<(String, i64, String)>) {
    records.retain(|r| known.contains(&(r.host.clone(), r.port, r.name.clone())));
}

/// One identity row per distinct name, first description wins.
pub fn group_finding_names(records: &[CanonicalRecord], product_id: Uuid) -> Vec<FindingName> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::new();
    for record in records {
        if seen.insert(record.name.as_str()) {
            names.push(FindingName {
                id: Uuid::new_v4(),
                name: record.name.clone(),
                description: record.description.clone(),
                product_id,
                created_at: Utc::now(),
            });
        }
    }
    names
}

/// Unique (cve, finding name) pairs from CVE-bearing rows, with the
/// severity derived from the row's risk.
pub fn group_cves(
    records: &[CanonicalRecord],
    name_ids: &HashMap<String, Uuid>,
) -> VigilResult<Vec<CveRecord>> {
    let mut seen: HashSet<(String, Option<Uuid>)> = HashSet::new();
    let mut cves = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let Some(cve_name) = record
            .cve
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            continue;
        };
        let severity = parse_risk(record.risk.as_deref(), idx)?;
        let finding_name_id = name_ids.get(&record.name).copied();
        if seen.insert((cve_name.to_string(), finding_name_id)) {
            cves.push(CveRecord {
                id: Uuid::new_v4(),
                name: cve_name.to_string(),
                finding_name_id,
                severity,
                priority: None,
                epss: None,
                cvss: None,
                cvss_version: None,
                kev_list: false,
                vector: None,
                created_at: Utc::now(),
            });
        }
    }
    Ok(cves)
}

/// Join records to their identity ids and stamp the lifecycle columns.
///
/// VA rows always enter as NEW with a mandatory parseable risk; HA rows
/// carry the check verdict from the file and default a missing risk to
/// MEDIUM. Duplicate (identity, host, port) rows keep the first.
pub fn finalize_rows(
    records: &[CanonicalRecord],
    ctx: &UploadContext,
    name_ids: &HashMap<String, Uuid>,
) -> VigilResult<Vec<Finding>> {
    let label = ctx.storage_label();
    let mut seen: HashSet<(Uuid, String, i64)> = HashSet::new();
    let mut rows = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let row_no = idx + 1;
        let finding_name_id = name_ids.get(&record.name).copied().ok_or_else(|| {
            ValidationError::InvalidRow {
                row: row_no,
                reason: format!("finding name {:?} has no identity row", record.name),
            }
        })?;

        let (status, severity) = match ctx.kind {
            AssessmentKind::Va => (
                FindingStatus::New,
                parse_risk(record.risk.as_deref(), idx)?,
            ),
            AssessmentKind::Ha => {
                let raw_status = record.status.as_deref().unwrap_or("");
                let status = FindingStatus::parse_ha(raw_status).ok_or_else(|| {
                    ValidationError::InvalidRow {
                        row: row_no,
                        reason: format!("unparseable status {raw_status:?}"),
                    }
                })?;
                let severity = match record
                    .risk
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    None => Severity::Medium,
                    Some(risk) => parse_risk(Some(risk), idx)?,
                };
                (status, severity)
            }
        };

        if !seen.insert((finding_name_id, record.host.clone(), record.port)) {
            continue;
        }

        rows.push(Finding {
            id: Uuid::new_v4(),
            finding_name_id,
            product_id: ctx.product_id,
            plugin_id: ctx.plugin_id,
            host: record.host.clone(),
            port: record.port,
            status,
            severity,
            reopen: false,
            vpr_score: record.vpr_score.clone(),
            evidence: record.evidence.clone().unwrap_or_default(),
            remediation: record.remediation.clone().unwrap_or_default(),
            remark: None,
            internal_remark: None,
            finding_date: ctx.scan_date,
            last_update: ctx.scan_date,
            closed_at: None,
            closing_effort: None,
            delay_untill: None,
            label: if label.is_empty() {
                None
            } else {
                Some(label.clone())
            },
            created_at: Utc::now(),
        });
    }
    Ok(rows)
}

fn parse_risk(risk: Option<&str>, idx: usize) -> VigilResult<Severity> {
    let value = risk.unwrap_or("");
    Severity::parse(value).ok_or_else(|| {
        ValidationError::InvalidRow {
            row: idx + 1,
            reason: format!("unparseable risk {value:?}"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(name: &str, host: &str, port: i64) -> CanonicalRecord {
        CanonicalRecord {
            cve: None,
            risk: Some("High".to_string()),
            host: host.to_string(),
            port,
            name: name.to_string(),
            description: Some("desc".to_string()),
            remediation: None,
            evidence: None,
            vpr_score: None,
            status: None,
        }
    }

    fn va_ctx() -> UploadContext {
        UploadContext {
            product_id: Uuid::new_v4(),
            plugin_id: Uuid::new_v4(),
            kind: AssessmentKind::Va,
            scan_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            process_new_finding: true,
            overwrite: false,
            label: None,
        }
    }

    fn ids_for(records: &[CanonicalRecord], product_id: Uuid) -> HashMap<String, Uuid> {
        group_finding_names(records, product_id)
            .into_iter()
            .map(|n| (n.name, n.id))
            .collect()
    }

    #[test]
    fn identities_keep_first_description() {
        let mut a = record("Weak MAC", "h1", 22);
        a.description = Some("first".to_string());
        let mut b = record("Weak MAC", "h2", 22);
        b.description = Some("second".to_string());

        let names = group_finding_names(&[a, b], Uuid::new_v4());
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].description.as_deref(), Some("first"));
    }

    #[test]
    fn finalize_dedups_on_identity_host_port() {
        let ctx = va_ctx();
        let records = vec![
            record("Weak MAC", "h1", 22),
            record("Weak MAC", "h1", 22),
            record("Weak MAC", "h2", 22),
        ];
        let ids = ids_for(&records, ctx.product_id);
        let rows = finalize_rows(&records, &ctx, &ids).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == FindingStatus::New));
        assert!(rows.iter().all(|r| r.finding_date == ctx.scan_date));
        assert!(rows.iter().all(|r| r.last_update == ctx.scan_date));
    }

    #[test]
    fn va_rejects_unparseable_risk() {
        let ctx = va_ctx();
        let mut bad = record("Weak MAC", "h1", 22);
        bad.risk = Some("Severe".to_string());
        let ids = ids_for(std::slice::from_ref(&bad), ctx.product_id);
        assert!(finalize_rows(&[bad], &ctx, &ids).is_err());
    }

    #[test]
    fn ha_defaults_missing_risk_to_medium() {
        let mut ctx = va_ctx();
        ctx.kind = AssessmentKind::Ha;
        let mut rec = record("iam-check", "acct", 0);
        rec.risk = None;
        rec.status = Some("FAILED".to_string());
        let ids = ids_for(std::slice::from_ref(&rec), ctx.product_id);
        let rows = finalize_rows(&[rec], &ctx, &ids).unwrap();
        assert_eq!(rows[0].severity, Severity::Medium);
        assert_eq!(rows[0].status, FindingStatus::Failed);
    }

    #[test]
    fn ha_rejects_unknown_status() {
        let mut ctx = va_ctx();
        ctx.kind = AssessmentKind::Ha;
        let mut rec = record("iam-check", "acct", 0);
        rec.status = Some("OPEN".to_string());
        let ids = ids_for(std::slice::from_ref(&rec), ctx.product_id);
        assert!(finalize_rows(&[rec], &ctx, &ids).is_err());
    }

    #[test]
    fn ha_prenormalize_strips_quotes() {
        let mut rec = record("\"quoted-check\"", "acct", 0);
        rec.status = Some("PASSED".to_string());
        let mut records = vec![rec];
        prenormalize_ha(&mut records);
        assert_eq!(records[0].name, "quoted-check");
    }

    #[test]
    fn cve_grouping_skips_blank_and_dedups() {
        let mut a = record("Log4Shell", "h1", 443);
        a.cve = Some("CVE-2021-44228".to_string());
        let mut b = record("Log4Shell", "h2", 443);
        b.cve = Some("CVE-2021-44228".to_string());
        let c = record("No CVE here", "h1", 80);

        let records = vec![a, b, c];
        let ids = ids_for(&records, Uuid::new_v4());
        let cves = group_cves(&records, &ids).unwrap();
        assert_eq!(cves.len(), 1);
        assert_eq!(cves[0].name, "CVE-2021-44228");
        assert_eq!(cves[0].severity, Severity::High);
        assert!(cves[0].priority.is_none());
    }

    #[test]
    fn new_finding_filter_drops_unknown_triples() {
        let mut records = vec![record("Weak MAC", "h1", 22), record("Weak MAC", "h2", 22)];
        let known: HashSet<(String, i64, String)> =
            [("h1".to_string(), 22, "Weak MAC".to_string())].into();
        retain_known(&mut records, &known);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].host, "h1");
    }
}
