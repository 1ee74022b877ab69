//! Canonical output schemas and record conversion.

use vigil_core::errors::{ValidationError, VigilResult};
use vigil_core::types::{AssessmentKind, CanonicalRecord};

use crate::table::{DType, Table, Value};

/// Canonical VA columns, in interchange order.
pub const VA_SCHEMA: &[(&str, DType)] = &[
    ("cve", DType::Text),
    ("risk", DType::Text),
    ("host", DType::Text),
    ("port", DType::Int64),
    ("name", DType::Text),
    ("description", DType::Text),
    ("remediation", DType::Text),
    ("evidence", DType::Text),
    ("vpr_score", DType::Text),
];

/// Canonical HA columns, in interchange order.
pub const HA_SCHEMA: &[(&str, DType)] = &[
    ("risk", DType::Text),
    ("host", DType::Text),
    ("port", DType::Int64),
    ("name", DType::Text),
    ("description", DType::Text),
    ("remediation", DType::Text),
    ("evidence", DType::Text),
    ("status", DType::Text),
];

pub fn expected_schema(kind: AssessmentKind) -> &'static [(&'static str, DType)] {
    match kind {
        AssessmentKind::Va => VA_SCHEMA,
        AssessmentKind::Ha => HA_SCHEMA,
    }
}

/// Column names of the canonical schema for `kind`, in order.
pub fn schema_columns(kind: AssessmentKind) -> Vec<&'static str> {
    expected_schema(kind).iter().map(|(name, _)| *name).collect()
}

/// Gate a plugin's output against the canonical schema.
///
/// The column set must match exactly (order ignored) and every column
/// must carry the declared type. Any deviation is reported in one
/// [`ValidationError::SchemaMismatch`] so the uploader sees the whole
/// problem at once.
pub fn validate_schema(table: &Table, kind: AssessmentKind) -> VigilResult<()> {
    let expected = expected_schema(kind);

    let mut missing = Vec::new();
    let mut mistyped = Vec::new();
    for (name, dtype) in expected {
        match table.columns().iter().find(|c| c.name == *name) {
            None => missing.push((*name).to_string()),
            Some(col) if col.dtype != *dtype => mistyped.push(format!(
                "{name}: expected {}, got {}",
                dtype.as_str(),
                col.dtype.as_str()
            )),
            Some(_) => {}
        }
    }
    let unexpected: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| expected.iter().all(|(name, _)| c.name != *name))
        .map(|c| c.name.clone())
        .collect();

    if missing.is_empty() && unexpected.is_empty() && mistyped.is_empty() {
        return Ok(());
    }
    Err(ValidationError::SchemaMismatch {
        kind: kind.as_str().to_string(),
        missing,
        unexpected,
        mistyped,
    }
    .into())
}

/// Convert a schema-valid table into canonical records.
///
/// `host`, `port`, and `name` must be non-null in every row; a null
/// there is a plugin defect surfaced as [`ValidationError::InvalidRow`].
/// Optional text cells map null and whitespace-only values to `None`.
pub fn canonical_records(table: &Table, kind: AssessmentKind) -> VigilResult<Vec<CanonicalRecord>> {
    validate_schema(table, kind)?;

    let mut records = Vec::with_capacity(table.n_rows());
    for row_no in 0..table.n_rows() {
        let row = row_no + 1;
        let host = required_text(table, row_no, "host")?;
        let name = required_text(table, row_no, "name")?;
        let port = match table.value(row_no, "port") {
            Some(Value::Int(n)) => *n,
            _ => {
                return Err(ValidationError::InvalidRow {
                    row,
                    reason: "port is empty".to_string(),
                }
                .into())
            }
        };

        let record = CanonicalRecord {
            cve: optional_text(table, row_no, "cve"),
            risk: optional_text(table, row_no, "risk"),
            host,
            port,
            name,
            description: optional_text(table, row_no, "description"),
            remediation: optional_text(table, row_no, "remediation"),
            evidence: optional_text(table, row_no, "evidence"),
            vpr_score: optional_text(table, row_no, "vpr_score"),
            status: optional_text(table, row_no, "status"),
        };
        records.push(record);
    }
    Ok(records)
}

fn required_text(table: &Table, row_no: usize, name: &str) -> VigilResult<String> {
    match table.value(row_no, name) {
        Some(Value::Text(s)) => Ok(s.clone()),
        _ => Err(ValidationError::InvalidRow {
            row: row_no + 1,
            reason: format!("{name} is empty"),
        }
        .into()),
    }
}

fn optional_text(table: &Table, row_no: usize, name: &str) -> Option<String> {
    match table.value(row_no, name) {
        Some(Value::Text(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
