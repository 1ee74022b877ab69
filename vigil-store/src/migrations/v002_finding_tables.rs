//! v002: finding_names, findings, and the live-occurrence uniqueness index.

use rusqlite::Connection;

use vigil_core::errors::VigilResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VigilResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS finding_names (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT,
            product_id  TEXT NOT NULL REFERENCES products(id),
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            UNIQUE (name, product_id)
        );

        CREATE INDEX IF NOT EXISTS idx_finding_names_product
            ON finding_names(product_id);

        CREATE TABLE IF NOT EXISTS findings (
            id              TEXT PRIMARY KEY,
            finding_name_id TEXT NOT NULL REFERENCES finding_names(id),
            product_id      TEXT NOT NULL REFERENCES products(id),
            plugin_id       TEXT NOT NULL REFERENCES plugins(id),
            host            TEXT NOT NULL,
            port            INTEGER NOT NULL,
            status          TEXT NOT NULL,
            severity        TEXT NOT NULL,
            reopen          INTEGER NOT NULL DEFAULT 0,
            vpr_score       TEXT,
            evidence        TEXT NOT NULL DEFAULT '',
            remediation     TEXT NOT NULL DEFAULT '',
            remark          TEXT,
            internal_remark TEXT,
            finding_date    TEXT NOT NULL,
            last_update     TEXT NOT NULL,
            closed_at       TEXT,
            closing_effort  INTEGER,
            delay_untill    TEXT,
            label           TEXT NOT NULL DEFAULT '',
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        -- at most one live occurrence per identity/host/port/plugin/product/label;
        -- terminal rows fall outside the constraint so history can accumulate
        CREATE UNIQUE INDEX IF NOT EXISTS uix_findings_live
            ON findings(finding_name_id, host, port, plugin_id, product_id, label)
            WHERE status NOT IN ('CLOSED', 'PASSED');

        CREATE INDEX IF NOT EXISTS idx_findings_product_plugin
            ON findings(product_id, plugin_id);
        CREATE INDEX IF NOT EXISTS idx_findings_status
            ON findings(status);
        CREATE INDEX IF NOT EXISTS idx_findings_finding_date
            ON findings(finding_date);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
