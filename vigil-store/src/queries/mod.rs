//! Per-entity query modules.
//!
//! Every function takes a `&rusqlite::Connection` so the ingestion
//! engine can compose them inside one transaction.

pub mod catalog_ops;
pub mod cve_ops;
pub mod finding_name_ops;
pub mod finding_ops;
pub mod revert_ops;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use vigil_core::errors::VigilResult;

use crate::to_storage_err;

pub(crate) fn parse_uuid(s: &str) -> VigilResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| to_storage_err(format!("bad uuid {s:?}: {e}")))
}

pub(crate) fn parse_date(s: &str) -> VigilResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| to_storage_err(format!("bad date {s:?}: {e}")))
}

pub(crate) fn parse_timestamp(s: &str) -> VigilResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp {s:?}: {e}")))
}
