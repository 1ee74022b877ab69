//! Schema migrations, applied in order at engine startup.
//!
//! Every statement is `IF NOT EXISTS`-guarded, so re-running the chain
//! against an existing database is a no-op. The applied version is
//! tracked in `schema_version`.

pub mod v001_catalog_tables;
pub mod v002_finding_tables;
pub mod v003_cve_tables;
pub mod v004_revert_tables;

use rusqlite::Connection;

use vigil_core::errors::{StorageError, VigilResult};

use crate::to_storage_err;

type Migration = (u32, fn(&Connection) -> VigilResult<()>);

const MIGRATIONS: &[Migration] = &[
    (1, v001_catalog_tables::migrate),
    (2, v002_finding_tables::migrate),
    (3, v003_cve_tables::migrate),
    (4, v004_revert_tables::migrate),
];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> VigilResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            vigil_core::VigilError::from(StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }
    Ok(())
}
