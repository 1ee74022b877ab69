//! CSV decoding with header normalization.

use csv::ReaderBuilder;
use vigil_core::errors::{ValidationError, VigilResult};

use crate::table::{Column, DType, Table, Value};

/// Lower-case a raw header and join its words with underscores.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Decode a CSV payload into an all-text table.
///
/// Headers are normalized through [`normalize_header`]; empty fields
/// become nulls so downstream fills and casts can tell "absent" from
/// a real empty string.
pub fn read_csv(raw: &[u8]) -> VigilResult<Table> {
    let mut reader = ReaderBuilder::new().flexible(false).from_reader(raw);
    let headers = reader
        .headers()
        .map_err(|e| ValidationError::PluginMismatch {
            reason: format!("unreadable csv header: {e}"),
        })?
        .clone();
    let columns: Vec<Column> = headers
        .iter()
        .map(|h| Column {
            name: normalize_header(h),
            dtype: DType::Text,
        })
        .collect();

    let mut table = Table::new(columns);
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ValidationError::PluginMismatch {
            // header is line 1
            reason: format!("csv line {}: {e}", idx + 2),
        })?;
        let row: Vec<Value> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Value::Null
                } else {
                    Value::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}
