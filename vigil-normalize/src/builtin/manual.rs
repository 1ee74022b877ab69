//! Passthrough for hand-maintained canonical CSVs.

use vigil_core::errors::VigilResult;
use vigil_core::types::AssessmentKind;

use crate::csv_read::read_csv;
use crate::plugin::Normalizer;
use crate::schema::schema_columns;
use crate::table::{Table, Value};
use crate::text::sanitize_breaks;

/// Normalizer for manually curated findings.
///
/// The file is already in canonical column shape; this only normalizes
/// headers, flattens line breaks, and casts `port`.
pub struct ManualCsv;

impl Normalizer for ManualCsv {
    fn process(&self, raw: &[u8]) -> VigilResult<Table> {
        let mut table = read_csv(raw)?;
        for column in ["description", "remediation", "evidence"] {
            if table.has_column(column) {
                table.map_column(column, |value| match value {
                    Value::Text(s) => Value::Text(sanitize_breaks(&s)),
                    other => other,
                })?;
            }
        }
        table.cast_int("port")?;
        table.select(&schema_columns(AssessmentKind::Va))?;
        Ok(table)
    }
}
