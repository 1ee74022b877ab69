//! The single write connection, guarded by a mutex.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use vigil_core::errors::{StorageError, VigilResult};
use vigil_core::VigilError;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Exclusive write connection. SQLite allows one writer at a time; the
/// mutex makes that explicit at the API level.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open the write connection for the given database file.
    pub fn open(path: &Path) -> VigilResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory write connection (for testing).
    pub fn open_in_memory() -> VigilResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure with exclusive access to the writer.
    pub fn with_conn_sync<F, T>(&self, f: F) -> VigilResult<T>
    where
        F: FnOnce(&Connection) -> VigilResult<T>,
    {
        let guard = self.conn.lock().map_err(|e| {
            VigilError::from(StorageError::LockPoisoned {
                message: e.to_string(),
            })
        })?;
        f(&guard)
    }
}
