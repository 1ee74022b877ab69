//! Product and plugin catalog rows.

use rusqlite::{params, Connection};
use uuid::Uuid;

use vigil_core::errors::VigilResult;
use vigil_core::types::{AssessmentKind, PluginSpec, Product};

use super::{parse_timestamp, parse_uuid};
use crate::{to_storage_err, OptionalRow};

pub fn insert_product(conn: &Connection, product: &Product) -> VigilResult<()> {
    conn.execute(
        "INSERT INTO products (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![
            product.id.to_string(),
            product.name,
            product.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_product(conn: &Connection, id: Uuid) -> VigilResult<Option<Product>> {
    let raw = conn
        .query_row(
            "SELECT id, name, created_at FROM products WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(|(id, name, created_at)| {
        Ok(Product {
            id: parse_uuid(&id)?,
            name,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

pub fn list_products(conn: &Connection) -> VigilResult<Vec<Product>> {
    let mut stmt = conn
        .prepare("SELECT id, name, created_at FROM products ORDER BY name")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<(String, String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter()
        .map(|(id, name, created_at)| {
            Ok(Product {
                id: parse_uuid(&id)?,
                name,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}

pub fn insert_plugin(conn: &Connection, plugin: &PluginSpec) -> VigilResult<()> {
    conn.execute(
        "INSERT INTO plugins (id, name, kind, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            plugin.id.to_string(),
            plugin.name,
            plugin.kind.as_str(),
            plugin.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_plugin(conn: &Connection, id: Uuid) -> VigilResult<Option<PluginSpec>> {
    let raw = conn
        .query_row(
            "SELECT id, name, kind, created_at FROM plugins WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(|(id, name, kind, created_at)| {
        let kind = AssessmentKind::parse(&kind)
            .ok_or_else(|| to_storage_err(format!("unknown assessment kind {kind:?}")))?;
        Ok(PluginSpec {
            id: parse_uuid(&id)?,
            name,
            kind,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

pub fn list_plugins(conn: &Connection) -> VigilResult<Vec<PluginSpec>> {
    let mut stmt = conn
        .prepare("SELECT id, name, kind, created_at FROM plugins ORDER BY kind, name")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<(String, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter()
        .map(|(id, name, kind, created_at)| {
            let kind = AssessmentKind::parse(&kind)
                .ok_or_else(|| to_storage_err(format!("unknown assessment kind {kind:?}")))?;
            Ok(PluginSpec {
                id: parse_uuid(&id)?,
                name,
                kind,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}
