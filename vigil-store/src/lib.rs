//! # vigil-store
//!
//! SQLite persistence for the finding tracker: catalog rows (products,
//! plugins), finding identities and occurrences, CVE scoring fields, and
//! the per-product revert snapshot.
//!
//! One write connection behind a mutex; migrations run at open. Query
//! logic lives in per-entity modules under [`queries`], all taking a
//! `&rusqlite::Connection` so callers can compose them inside a single
//! transaction.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StoreEngine;

use vigil_core::errors::StorageError;
use vigil_core::VigilError;

/// Wrap a raw SQLite failure into the workspace error type.
pub(crate) fn to_storage_err(message: String) -> VigilError {
    StorageError::SqliteError { message }.into()
}

/// Helper trait to make `query_row` return `Option` on not-found.
pub(crate) trait OptionalRow<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalRow<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
