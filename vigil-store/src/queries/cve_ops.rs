//! CVE rows and the enrichment write-back.

use rusqlite::{params, Connection};

use vigil_core::errors::VigilResult;
use vigil_core::types::{CveRecord, Priority, PriorityResult, Severity};

use super::{parse_timestamp, parse_uuid};
use crate::{to_storage_err, OptionalRow};

/// Insert-if-absent on the globally unique CVE name.
pub fn insert_ignore(conn: &Connection, cve: &CveRecord) -> VigilResult<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO cves (
                id, name, finding_name_id, severity, priority, epss, cvss,
                cvss_version, kev_list, vector, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                cve.id.to_string(),
                cve.name,
                cve.finding_name_id.map(|id| id.to_string()),
                cve.severity.as_str(),
                cve.priority.map(|p| p.as_str()),
                cve.epss,
                cve.cvss,
                cve.cvss_version,
                cve.kev_list as i64,
                cve.vector,
                cve.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(inserted == 1)
}

/// CVE names still waiting for a priority. The enrichment job drains
/// this list in chunks.
pub fn unscored_names(conn: &Connection) -> VigilResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM cves WHERE priority IS NULL ORDER BY name")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Write one enrichment outcome back. A null NVD severity keeps the
/// ingestion-derived one.
pub fn apply_priority(conn: &Connection, result: &PriorityResult) -> VigilResult<usize> {
    let affected = conn
        .execute(
            "UPDATE cves
             SET priority = ?2,
                 epss = ?3,
                 cvss = ?4,
                 cvss_version = ?5,
                 kev_list = ?6,
                 vector = ?7,
                 severity = COALESCE(?8, severity)
             WHERE name = ?1",
            params![
                result.cve_id,
                result.priority.as_str(),
                result.epss,
                result.cvss,
                result.cvss_version,
                result.kev_list as i64,
                result.vector,
                result.severity,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(affected)
}

/// Apply one enrichment chunk atomically.
pub fn bulk_apply_priorities(
    conn: &Connection,
    results: &[PriorityResult],
) -> VigilResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("bulk_apply_priorities begin: {e}")))?;

    let mut updated = 0;
    for result in results {
        match apply_priority(&tx, result) {
            Ok(n) => updated += n,
            Err(e) => {
                let _ = tx.rollback();
                return Err(e);
            }
        }
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("bulk_apply_priorities commit: {e}")))?;
    Ok(updated)
}

pub fn get_by_name(conn: &Connection, name: &str) -> VigilResult<Option<CveRecord>> {
    let raw = conn
        .query_row(
            "SELECT id, name, finding_name_id, severity, priority, epss, cvss,
                    cvss_version, kev_list, vector, created_at
             FROM cves WHERE name = ?1",
            [name],
            |row| {
                Ok(RawCve {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    finding_name_id: row.get(2)?,
                    severity: row.get(3)?,
                    priority: row.get(4)?,
                    epss: row.get(5)?,
                    cvss: row.get(6)?,
                    cvss_version: row.get(7)?,
                    kev_list: row.get(8)?,
                    vector: row.get(9)?,
                    created_at: row.get(10)?,
                })
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(into_cve).transpose()
}

struct RawCve {
    id: String,
    name: String,
    finding_name_id: Option<String>,
    severity: String,
    priority: Option<String>,
    epss: Option<f64>,
    cvss: Option<f64>,
    cvss_version: Option<String>,
    kev_list: i64,
    vector: Option<String>,
    created_at: String,
}

fn into_cve(raw: RawCve) -> VigilResult<CveRecord> {
    let severity = Severity::parse(&raw.severity)
        .ok_or_else(|| to_storage_err(format!("unknown severity {:?}", raw.severity)))?;
    let priority = match raw.priority.as_deref() {
        Some(p) => Some(
            Priority::parse(p)
                .ok_or_else(|| to_storage_err(format!("unknown priority {p:?}")))?,
        ),
        None => None,
    };
    Ok(CveRecord {
        id: parse_uuid(&raw.id)?,
        name: raw.name,
        finding_name_id: raw
            .finding_name_id
            .as_deref()
            .map(parse_uuid)
            .transpose()?,
        severity,
        priority,
        epss: raw.epss,
        cvss: raw.cvss,
        cvss_version: raw.cvss_version,
        kev_list: raw.kev_list != 0,
        vector: raw.vector,
        created_at: parse_timestamp(&raw.created_at)?,
    })
}
