//! AWS Security Hub export normalizer (compliance checks).

use vigil_core::errors::VigilResult;
use vigil_core::types::AssessmentKind;

use crate::csv_read::read_csv;
use crate::plugin::Normalizer;
use crate::schema::schema_columns;
use crate::table::{DType, Table, Value};
use crate::text::sanitize_breaks;

/// Normalizer for AWS Security Hub compliance exports.
///
/// Keeps only `Security Hub` control rows, maps the compliance verdict
/// onto the canonical `status` column, and leaves `risk` null so the
/// reconciler applies its severity default. Checks are account-level,
/// so every row lands on port 0.
pub struct AwsSecurityHub;

impl Normalizer for AwsSecurityHub {
    fn process(&self, raw: &[u8]) -> VigilResult<Table> {
        let mut table = read_csv(raw)?;
        table.retain("product_name", |value| {
            matches!(value, Value::Text(s) if s == "Security Hub")
        })?;

        super::aws_inspector::resolve_host(&mut table)?;

        // evidence mirrors the remediation text before the rename below
        table.with_column("evidence", DType::Text, |row| {
            match row.get("remediation_text") {
                Some(Value::Text(s)) => Value::Text(s.clone()),
                _ => Value::Null,
            }
        })?;

        table.rename("title", "name")?;
        table.rename("compliance", "status")?;
        table.rename_if_present("remediation_text", "remediation")?;

        for column in ["description", "remediation", "evidence"] {
            if table.has_column(column) {
                table.map_column(column, |value| match value {
                    Value::Text(s) => Value::Text(sanitize_breaks(&s)),
                    other => other,
                })?;
            }
        }

        table.with_column("port", DType::Int64, |_| Value::Int(0))?;
        table.ensure_column("risk", DType::Text, Value::Null);
        table.ensure_column("remediation", DType::Text, Value::Null);
        table.ensure_column("description", DType::Text, Value::Null);

        table.select(&schema_columns(AssessmentKind::Ha))?;
        Ok(table)
    }
}
