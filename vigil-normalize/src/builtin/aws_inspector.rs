//! AWS Inspector export normalizer (vulnerability findings).

use vigil_core::errors::VigilResult;
use vigil_core::types::AssessmentKind;

use crate::csv_read::read_csv;
use crate::plugin::Normalizer;
use crate::schema::schema_columns;
use crate::table::{DType, Table, Value};
use crate::text::{extract_cve, host_from_tags, sanitize_breaks, strip_cve};

/// Normalizer for AWS Inspector CSV exports.
///
/// Mixed Security Hub exports carry multiple products; only `Inspector`
/// rows are vulnerability findings. Hosts are resolved from the resource
/// tag map (falling back to the resource id), the CVE identifier is
/// lifted out of the title, and columns the export does not carry are
/// filled with empty text so the canonical schema is always complete.
pub struct AwsInspector;

impl Normalizer for AwsInspector {
    fn process(&self, raw: &[u8]) -> VigilResult<Table> {
        let mut table = read_csv(raw)?;
        table.retain("product_name", |value| {
            matches!(value, Value::Text(s) if s == "Inspector")
        })?;

        resolve_host(&mut table)?;

        table.with_column("cve", DType::Text, |row| {
            match row.get("title") {
                Some(Value::Text(title)) => match extract_cve(title) {
                    Some(cve) => Value::Text(cve),
                    None => Value::Null,
                },
                _ => Value::Null,
            }
        })?;
        table.with_column("name", DType::Text, |row| match row.get("title") {
            Some(Value::Text(title)) => Value::Text(strip_cve(title)),
            _ => Value::Null,
        })?;

        for column in ["description", "remediation_text"] {
            if table.has_column(column) {
                table.map_column(column, |value| match value {
                    Value::Text(s) => Value::Text(sanitize_breaks(&s)),
                    other => other,
                })?;
            }
        }

        table.rename("severity", "risk")?;
        table.rename_if_present("remediation_text", "remediation")?;

        table.ensure_column("port", DType::Text, Value::Null);
        table.cast_int("port")?;
        table.fill_null("port", Value::Int(0))?;

        for column in ["description", "remediation", "evidence", "vpr_score"] {
            table.ensure_column(column, DType::Text, Value::Text(String::new()));
            table.fill_null(column, Value::Text(String::new()))?;
        }

        table.select(&schema_columns(AssessmentKind::Va))?;
        Ok(table)
    }
}

/// Host resolution shared with the Security Hub plugin.
pub(crate) fn resolve_host(table: &mut Table) -> VigilResult<()> {
    table.with_column("host", DType::Text, |row| {
        let fallback = row.text_or_empty("resource_id");
        match row.get("resource_tags") {
            Some(Value::Text(tags)) => Value::Text(host_from_tags(tags, fallback)),
            _ => Value::Text(fallback.to_string()),
        }
    })
}
