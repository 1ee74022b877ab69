//! Finding identity rows, unique on (name, product).

use std::collections::HashMap;

use rusqlite::{params, Connection};
use uuid::Uuid;

use vigil_core::errors::VigilResult;
use vigil_core::types::FindingName;

use super::{parse_timestamp, parse_uuid};
use crate::{to_storage_err, OptionalRow};

/// Insert-if-absent. Returns whether a new identity was created; an
/// existing (name, product) row keeps its first description.
pub fn insert_ignore(conn: &Connection, finding_name: &FindingName) -> VigilResult<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO finding_names (id, name, description, product_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                finding_name.id.to_string(),
                finding_name.name,
                finding_name.description,
                finding_name.product_id.to_string(),
                finding_name.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(inserted == 1)
}

pub fn get_by_name(
    conn: &Connection,
    product_id: Uuid,
    name: &str,
) -> VigilResult<Option<FindingName>> {
    let raw = conn
        .query_row(
            "SELECT id, name, description, product_id, created_at
             FROM finding_names WHERE product_id = ?1 AND name = ?2",
            params![product_id.to_string(), name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(|(id, name, description, product_id, created_at)| {
        Ok(FindingName {
            id: parse_uuid(&id)?,
            name,
            description,
            product_id: parse_uuid(&product_id)?,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

/// All identity ids of a product, keyed by name. The reconciler joins
/// incoming rows against this map after the insert-if-absent pass.
pub fn name_ids(conn: &Connection, product_id: Uuid) -> VigilResult<HashMap<String, Uuid>> {
    let mut stmt = conn
        .prepare("SELECT name, id FROM finding_names WHERE product_id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<(String, String)> = stmt
        .query_map([product_id.to_string()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut map = HashMap::with_capacity(raw.len());
    for (name, id) in raw {
        map.insert(name, parse_uuid(&id)?);
    }
    Ok(map)
}

pub fn list_for_product(conn: &Connection, product_id: Uuid) -> VigilResult<Vec<FindingName>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, product_id, created_at
             FROM finding_names WHERE product_id = ?1 ORDER BY name",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<(String, String, Option<String>, String, String)> = stmt
        .query_map([product_id.to_string()], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter()
        .map(|(id, name, description, product_id, created_at)| {
            Ok(FindingName {
                id: parse_uuid(&id)?,
                name,
                description,
                product_id: parse_uuid(&product_id)?,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}
