//! Product-level snapshot and restore.
//!
//! One snapshot per product: taking a new one replaces the previous.
//! Rows are copied verbatim in SQL (ids preserved) in both directions,
//! so a restore reproduces the exact pre-overwrite state.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use vigil_core::errors::VigilResult;

use super::finding_ops::FINDING_COLUMNS;
use super::parse_date;
use crate::to_storage_err;

/// Copy the product's live rows into the snapshot table, replacing any
/// prior snapshot. Returns how many rows were captured.
pub fn snapshot_product(conn: &Connection, product_id: Uuid) -> VigilResult<usize> {
    conn.execute(
        "DELETE FROM finding_revert_points WHERE product_id = ?1",
        [product_id.to_string()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let sql = format!(
        "INSERT INTO finding_revert_points ({FINDING_COLUMNS})
         SELECT {FINDING_COLUMNS} FROM findings WHERE product_id = ?1"
    );
    let captured = conn
        .execute(&sql, [product_id.to_string()])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(captured)
}

pub fn has_snapshot(conn: &Connection, product_id: Uuid) -> VigilResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM finding_revert_points WHERE product_id = ?1",
            [product_id.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count > 0)
}

/// Most recent `last_update` captured in the product's snapshot.
pub fn snapshot_max_last_update(
    conn: &Connection,
    product_id: Uuid,
) -> VigilResult<Option<NaiveDate>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT MAX(last_update) FROM finding_revert_points WHERE product_id = ?1",
            [product_id.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.as_deref().map(parse_date).transpose()
}

/// Replace the product's live rows with the snapshot and consume it.
/// Returns how many rows were restored.
pub fn restore_product(conn: &Connection, product_id: Uuid) -> VigilResult<usize> {
    conn.execute(
        "DELETE FROM findings WHERE product_id = ?1",
        [product_id.to_string()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let sql = format!(
        "INSERT INTO findings ({FINDING_COLUMNS})
         SELECT {FINDING_COLUMNS} FROM finding_revert_points WHERE product_id = ?1"
    );
    let restored = conn
        .execute(&sql, [product_id.to_string()])
        .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "DELETE FROM finding_revert_points WHERE product_id = ?1",
        [product_id.to_string()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(restored)
}

/// Drop the product's snapshot without restoring it.
pub fn clear(conn: &Connection, product_id: Uuid) -> VigilResult<usize> {
    let dropped = conn
        .execute(
            "DELETE FROM finding_revert_points WHERE product_id = ?1",
            params![product_id.to_string()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(dropped)
}
