//! Tenable Nessus export normalizer.

use vigil_core::errors::VigilResult;
use vigil_core::types::AssessmentKind;

use crate::csv_read::read_csv;
use crate::plugin::Normalizer;
use crate::schema::schema_columns;
use crate::table::{Table, Value};
use crate::text::sanitize_breaks;

/// Normalizer for Nessus CSV exports.
///
/// Drops informational rows (risk `None`), flattens line breaks in the
/// long-text columns, and maps `solution` / `plugin_output` onto the
/// canonical `remediation` / `evidence` columns. Vendor columns outside
/// the canonical set are discarded.
pub struct Nessus;

impl Normalizer for Nessus {
    fn process(&self, raw: &[u8]) -> VigilResult<Table> {
        let mut table = base_transform(raw)?;
        table.select(&schema_columns(AssessmentKind::Va))?;
        Ok(table)
    }
}

/// Shared Nessus transform, reused by the cloud-assets variant.
pub(crate) fn base_transform(raw: &[u8]) -> VigilResult<Table> {
    let mut table = read_csv(raw)?;

    // "None" marks informational plugins with no risk attached.
    table.retain("risk", |risk| {
        matches!(risk, Value::Text(s) if s != "None")
    })?;

    for column in ["description", "solution", "plugin_output"] {
        table.map_column(column, |value| match value {
            Value::Text(s) => Value::Text(sanitize_breaks(&s)),
            other => other,
        })?;
    }
    table.rename("solution", "remediation")?;
    table.rename("plugin_output", "evidence")?;
    table.cast_int("port")?;
    Ok(table)
}
