//! Finding occurrence rows: upsert, lifecycle sweeps, reads.

use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use vigil_core::errors::VigilResult;
use vigil_core::types::{AssessmentKind, Finding, FindingStatus, Severity};

use super::{parse_date, parse_timestamp, parse_uuid};
use crate::{to_storage_err, OptionalRow};

pub(crate) const FINDING_COLUMNS: &str = "id, finding_name_id, product_id, plugin_id, host, \
     port, status, severity, reopen, vpr_score, evidence, remediation, remark, \
     internal_remark, finding_date, last_update, closed_at, closing_effort, \
     delay_untill, label, created_at";

/// Outcome of one occurrence upsert, discriminated by the row's
/// `finding_date`: a fresh insert comes back stamped with the upload's
/// scan date, a conflict update keeps its original discovery date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Upsert one finalized row against the live-occurrence constraint.
///
/// The conflict target mirrors the partial unique index: only rows not
/// in a terminal status can collide, so a previously closed occurrence
/// is re-inserted as a new row. On conflict VA forces `OPEN` (the row
/// was reconfirmed), HA takes the incoming check verdict; `finding_date`
/// and `finding_name_id` are never overwritten. HA uploads carry no
/// `vpr_score`, so the update set leaves it untouched.
pub fn upsert_finding(
    conn: &Connection,
    finding: &Finding,
    kind: AssessmentKind,
) -> VigilResult<UpsertOutcome> {
    let status_update = match kind {
        AssessmentKind::Va => "status = 'OPEN'",
        AssessmentKind::Ha => "status = excluded.status",
    };
    let vpr_update = match kind {
        AssessmentKind::Va => "vpr_score = excluded.vpr_score,",
        AssessmentKind::Ha => "",
    };
    let sql = format!(
        "INSERT INTO findings ({FINDING_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                 ?15, ?16, ?17, ?18, ?19, ?20, ?21)
         ON CONFLICT (finding_name_id, host, port, plugin_id, product_id, label)
             WHERE status NOT IN ('CLOSED', 'PASSED')
         DO UPDATE SET
             {status_update},
             severity = excluded.severity,
             {vpr_update}
             evidence = excluded.evidence,
             remediation = excluded.remediation,
             last_update = excluded.last_update
         RETURNING finding_date"
    );

    let returned: String = conn
        .query_row(
            &sql,
            params![
                finding.id.to_string(),
                finding.finding_name_id.to_string(),
                finding.product_id.to_string(),
                finding.plugin_id.to_string(),
                finding.host,
                finding.port,
                finding.status.as_str(),
                finding.severity.as_str(),
                finding.reopen as i64,
                finding.vpr_score,
                finding.evidence,
                finding.remediation,
                finding.remark,
                finding.internal_remark,
                finding.finding_date.to_string(),
                finding.last_update.to_string(),
                finding.closed_at.map(|d| d.to_string()),
                finding.closing_effort,
                finding.delay_untill.map(|d| d.to_string()),
                finding.label.as_deref().unwrap_or(""),
                finding.created_at.to_rfc3339(),
            ],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if parse_date(&returned)? == finding.finding_date {
        Ok(UpsertOutcome::Created)
    } else {
        Ok(UpsertOutcome::Updated)
    }
}

/// Transition every occurrence this upload did not reconfirm into the
/// kind's terminal status, stamping the closure date and effort.
pub fn close_sweep(
    conn: &Connection,
    product_id: Uuid,
    plugin_id: Uuid,
    scan_date: NaiveDate,
    kind: AssessmentKind,
) -> VigilResult<usize> {
    let terminal = FindingStatus::terminal_for(kind);
    let affected = conn
        .execute(
            "UPDATE findings
             SET status = ?1,
                 closed_at = ?2,
                 last_update = ?2,
                 closing_effort = CAST(julianday(?2) - julianday(finding_date) AS INTEGER)
             WHERE product_id = ?3 AND plugin_id = ?4
               AND last_update < ?2
               AND status NOT IN ('CLOSED', 'PASSED')",
            params![
                terminal.as_str(),
                scan_date.to_string(),
                product_id.to_string(),
                plugin_id.to_string(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(affected)
}

/// Reset rows still on their discovery date back to NEW. Catches rows a
/// same-day conflict update flipped to OPEN before anything else saw them.
pub fn first_seen_correction(
    conn: &Connection,
    product_id: Uuid,
    plugin_id: Uuid,
) -> VigilResult<usize> {
    let affected = conn
        .execute(
            "UPDATE findings
             SET status = 'NEW'
             WHERE product_id = ?1 AND plugin_id = ?2
               AND finding_date = last_update
               AND status NOT IN ('NEW', 'CLOSED')",
            params![product_id.to_string(), plugin_id.to_string()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(affected)
}

/// Flag occurrence groups that came back after a closure.
///
/// Groups (finding_name_id, host, port) with more than one distinct
/// `finding_date` are reopen candidates: the newest row gets an internal
/// remark naming both dates, the earliest CLOSED row gets `reopen = 1`.
/// Returns how many rows were newly flagged.
pub fn reopen_sweep(conn: &Connection, product_id: Uuid, plugin_id: Uuid) -> VigilResult<usize> {
    let groups: Vec<(String, String, i64, String, String)> = {
        let mut stmt = conn
            .prepare(
                "SELECT finding_name_id, host, port,
                        MIN(finding_date), MAX(finding_date)
                 FROM findings
                 WHERE product_id = ?1 AND plugin_id = ?2
                 GROUP BY finding_name_id, host, port
                 HAVING COUNT(DISTINCT finding_date) > 1",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![product_id.to_string(), plugin_id.to_string()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        rows.collect::<Result<_, _>>()
            .map_err(|e| to_storage_err(e.to_string()))?
    };

    let mut reopened = 0;
    for (finding_name_id, host, port, earliest, latest) in groups {
        let remark =
            format!("The finding is reopened on {latest} after first discovered on {earliest}");
        conn.execute(
            "UPDATE findings
             SET internal_remark = ?1
             WHERE product_id = ?2 AND plugin_id = ?3
               AND finding_name_id = ?4 AND host = ?5 AND port = ?6
               AND finding_date = ?7",
            params![
                remark,
                product_id.to_string(),
                plugin_id.to_string(),
                finding_name_id,
                host,
                port,
                latest,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

        reopened += conn
            .execute(
                "UPDATE findings
                 SET reopen = 1
                 WHERE product_id = ?1 AND plugin_id = ?2
                   AND finding_name_id = ?3 AND host = ?4 AND port = ?5
                   AND finding_date = ?6
                   AND status = 'CLOSED' AND reopen = 0",
                params![
                    product_id.to_string(),
                    plugin_id.to_string(),
                    finding_name_id,
                    host,
                    port,
                    earliest,
                ],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(reopened)
}

/// Every (host, port, name) triple the product has ever recorded. Used by
/// the new-finding filter to drop never-seen rows.
pub fn known_triples(
    conn: &Connection,
    product_id: Uuid,
) -> VigilResult<HashSet<(String, i64, String)>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT f.host, f.port, n.name
             FROM findings f
             JOIN finding_names n ON n.id = f.finding_name_id
             WHERE f.product_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([product_id.to_string()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Most recent `last_update` recorded for a product/plugin pair.
pub fn max_last_update(
    conn: &Connection,
    product_id: Uuid,
    plugin_id: Uuid,
) -> VigilResult<Option<NaiveDate>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT MAX(last_update) FROM findings WHERE product_id = ?1 AND plugin_id = ?2",
            params![product_id.to_string(), plugin_id.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.as_deref().map(parse_date).transpose()
}

/// Latest recorded `last_update` across all of a product's findings,
/// regardless of plugin. Used to decide whether a snapshot is still current.
pub fn max_last_update_product(
    conn: &Connection,
    product_id: Uuid,
) -> VigilResult<Option<NaiveDate>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT MAX(last_update) FROM findings WHERE product_id = ?1",
            params![product_id.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.as_deref().map(parse_date).transpose()
}

/// Drop a product's rows stamped with the given finding date. Run before
/// an overwrite re-ingests the same day.
pub fn delete_same_day(
    conn: &Connection,
    product_id: Uuid,
    scan_date: NaiveDate,
) -> VigilResult<usize> {
    let affected = conn
        .execute(
            "DELETE FROM findings WHERE product_id = ?1 AND finding_date = ?2",
            params![product_id.to_string(), scan_date.to_string()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(affected)
}

/// Physical delete of a product's findings, optionally one host only.
pub fn delete_findings(
    conn: &Connection,
    product_id: Uuid,
    host: Option<&str>,
) -> VigilResult<usize> {
    let affected = match host {
        Some(host) => conn
            .execute(
                "DELETE FROM findings WHERE product_id = ?1 AND host = ?2",
                params![product_id.to_string(), host],
            )
            .map_err(|e| to_storage_err(e.to_string()))?,
        None => conn
            .execute(
                "DELETE FROM findings WHERE product_id = ?1",
                [product_id.to_string()],
            )
            .map_err(|e| to_storage_err(e.to_string()))?,
    };
    Ok(affected)
}

pub fn get_finding(conn: &Connection, id: Uuid) -> VigilResult<Option<Finding>> {
    let sql = format!("SELECT {FINDING_COLUMNS} FROM findings WHERE id = ?1");
    let raw = conn
        .query_row(&sql, [id.to_string()], read_raw)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(into_finding).transpose()
}

pub fn list_for_product(conn: &Connection, product_id: Uuid) -> VigilResult<Vec<Finding>> {
    let sql = format!(
        "SELECT {FINDING_COLUMNS} FROM findings
         WHERE product_id = ?1
         ORDER BY finding_date, host, port, created_at"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<RawFinding> = stmt
        .query_map([product_id.to_string()], read_raw)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter().map(into_finding).collect()
}

pub(crate) struct RawFinding {
    id: String,
    finding_name_id: String,
    product_id: String,
    plugin_id: String,
    host: String,
    port: i64,
    status: String,
    severity: String,
    reopen: i64,
    vpr_score: Option<String>,
    evidence: String,
    remediation: String,
    remark: Option<String>,
    internal_remark: Option<String>,
    finding_date: String,
    last_update: String,
    closed_at: Option<String>,
    closing_effort: Option<i64>,
    delay_untill: Option<String>,
    label: String,
    created_at: String,
}

pub(crate) fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawFinding> {
    Ok(RawFinding {
        id: row.get(0)?,
        finding_name_id: row.get(1)?,
        product_id: row.get(2)?,
        plugin_id: row.get(3)?,
        host: row.get(4)?,
        port: row.get(5)?,
        status: row.get(6)?,
        severity: row.get(7)?,
        reopen: row.get(8)?,
        vpr_score: row.get(9)?,
        evidence: row.get(10)?,
        remediation: row.get(11)?,
        remark: row.get(12)?,
        internal_remark: row.get(13)?,
        finding_date: row.get(14)?,
        last_update: row.get(15)?,
        closed_at: row.get(16)?,
        closing_effort: row.get(17)?,
        delay_untill: row.get(18)?,
        label: row.get(19)?,
        created_at: row.get(20)?,
    })
}

pub(crate) fn into_finding(raw: RawFinding) -> VigilResult<Finding> {
    let status = FindingStatus::parse(&raw.status)
        .ok_or_else(|| to_storage_err(format!("unknown status {:?}", raw.status)))?;
    let severity = Severity::parse(&raw.severity)
        .ok_or_else(|| to_storage_err(format!("unknown severity {:?}", raw.severity)))?;
    Ok(Finding {
        id: parse_uuid(&raw.id)?,
        finding_name_id: parse_uuid(&raw.finding_name_id)?,
        product_id: parse_uuid(&raw.product_id)?,
        plugin_id: parse_uuid(&raw.plugin_id)?,
        host: raw.host,
        port: raw.port,
        status,
        severity,
        reopen: raw.reopen != 0,
        vpr_score: raw.vpr_score,
        evidence: raw.evidence,
        remediation: raw.remediation,
        remark: raw.remark,
        internal_remark: raw.internal_remark,
        finding_date: parse_date(&raw.finding_date)?,
        last_update: parse_date(&raw.last_update)?,
        closed_at: raw.closed_at.as_deref().map(parse_date).transpose()?,
        closing_effort: raw.closing_effort,
        delay_untill: raw.delay_untill.as_deref().map(parse_date).transpose()?,
        label: if raw.label.is_empty() {
            None
        } else {
            Some(raw.label)
        },
        created_at: parse_timestamp(&raw.created_at)?,
    })
}
