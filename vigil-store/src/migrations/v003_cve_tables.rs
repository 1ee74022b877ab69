//! v003: cves with the enrichment scoring columns.

use rusqlite::Connection;

use vigil_core::errors::VigilResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VigilResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cves (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL UNIQUE,
            finding_name_id TEXT REFERENCES finding_names(id),
            severity        TEXT NOT NULL,
            priority        TEXT,
            epss            REAL,
            cvss            REAL,
            cvss_version    TEXT,
            kev_list        INTEGER NOT NULL DEFAULT 0,
            vector          TEXT,
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_cves_priority ON cves(priority);
        CREATE INDEX IF NOT EXISTS idx_cves_finding_name ON cves(finding_name_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
