//! v004: finding_revert_points, column-identical to findings.
//!
//! The snapshot copies rows verbatim (ids included) so a revert can
//! restore them without touching any foreign reference.

use rusqlite::Connection;

use vigil_core::errors::VigilResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VigilResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS finding_revert_points (
            id              TEXT PRIMARY KEY,
            finding_name_id TEXT NOT NULL,
            product_id      TEXT NOT NULL,
            plugin_id       TEXT NOT NULL,
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
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_revert_points_product
            ON finding_revert_points(product_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
