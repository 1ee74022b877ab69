//! In-memory column table the normalizer plugins transform.
//!
//! A deliberately small stand-in for a dataframe: named, typed columns
//! over row-major values, with exactly the batch helpers the builtin
//! plugins need. Tables start all-text straight from CSV and are shaped
//! column by column until they match the canonical schema.

use std::collections::HashSet;

use vigil_core::errors::{ValidationError, VigilResult};

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Text,
    Int64,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Text => "string",
            DType::Int64 => "int64",
        }
    }
}

/// A single cell. `Null` stands for an empty field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Int(i64),
    Null,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Column descriptor: name plus declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
}

impl Column {
    pub fn text(name: &str) -> Self {
        Column {
            name: name.to_string(),
            dtype: DType::Text,
        }
    }

    pub fn int64(name: &str) -> Self {
        Column {
            name: name.to_string(),
            dtype: DType::Int64,
        }
    }
}

/// Read-only view over one row, addressable by column name.
pub struct RowView<'a> {
    columns: &'a [Column],
    row: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        self.row.get(idx)
    }

    /// Text content of a cell, `""` when the cell is null or missing.
    pub fn text_or_empty(&self, name: &str) -> &'a str {
        match self.get(name) {
            Some(Value::Text(s)) => s,
            _ => "",
        }
    }
}

/// Row-major table with a typed header.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

fn column_err(reason: String) -> vigil_core::VigilError {
    ValidationError::PluginMismatch { reason }.into()
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> VigilResult<()> {
        if row.len() != self.columns.len() {
            return Err(column_err(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn require_column(&self, name: &str) -> VigilResult<usize> {
        self.column_index(name)
            .ok_or_else(|| column_err(format!("column {name:?} not present")))
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn rename(&mut self, from: &str, to: &str) -> VigilResult<()> {
        if self.has_column(to) {
            return Err(column_err(format!("column {to:?} already present")));
        }
        let idx = self.require_column(from)?;
        self.columns[idx].name = to.to_string();
        Ok(())
    }

    /// Rename only when the source column exists. Returns whether it did.
    pub fn rename_if_present(&mut self, from: &str, to: &str) -> VigilResult<bool> {
        if !self.has_column(from) {
            return Ok(false);
        }
        self.rename(from, to)?;
        Ok(true)
    }

    /// Keep only rows whose cell in `name` satisfies the predicate.
    pub fn retain<F>(&mut self, name: &str, mut pred: F) -> VigilResult<()>
    where
        F: FnMut(&Value) -> bool,
    {
        let idx = self.require_column(name)?;
        self.rows.retain(|row| pred(&row[idx]));
        Ok(())
    }

    /// Rewrite every cell of one column in place.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> VigilResult<()>
    where
        F: FnMut(Value) -> Value,
    {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            let cell = std::mem::replace(&mut row[idx], Value::Null);
            row[idx] = f(cell);
        }
        Ok(())
    }

    /// Add or replace a column computed from each full row.
    pub fn with_column<F>(&mut self, name: &str, dtype: DType, mut f: F) -> VigilResult<()>
    where
        F: FnMut(&RowView<'_>) -> Value,
    {
        let values: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                f(&RowView {
                    columns: &self.columns,
                    row,
                })
            })
            .collect();
        match self.column_index(name) {
            Some(idx) => {
                self.columns[idx].dtype = dtype;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    dtype,
                });
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Append a constant column when it is not already present.
    pub fn ensure_column(&mut self, name: &str, dtype: DType, default: Value) {
        if self.has_column(name) {
            return;
        }
        self.columns.push(Column {
            name: name.to_string(),
            dtype,
        });
        for row in &mut self.rows {
            row.push(default.clone());
        }
    }

    /// Replace nulls in one column with a constant.
    pub fn fill_null(&mut self, name: &str, value: Value) -> VigilResult<()> {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            if row[idx].is_null() {
                row[idx] = value.clone();
            }
        }
        Ok(())
    }

    /// Parse a text column into 64-bit integers; nulls stay null.
    pub fn cast_int(&mut self, name: &str) -> VigilResult<()> {
        let idx = self.require_column(name)?;
        for (row_no, row) in self.rows.iter_mut().enumerate() {
            let parsed = match &row[idx] {
                Value::Text(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        Value::Null
                    } else {
                        let n = trimmed.parse::<i64>().map_err(|_| {
                            column_err(format!(
                                "row {}: cannot cast {trimmed:?} in column {name:?} to int64",
                                row_no + 1
                            ))
                        })?;
                        Value::Int(n)
                    }
                }
                Value::Int(n) => Value::Int(*n),
                Value::Null => Value::Null,
            };
            row[idx] = parsed;
        }
        self.columns[idx].dtype = DType::Int64;
        Ok(())
    }

    /// Project the table down to the named columns, in the given order.
    pub fn select(&mut self, names: &[&str]) -> VigilResult<()> {
        let indices: Vec<usize> = names
            .iter()
            .map(|name| self.require_column(name))
            .collect::<VigilResult<_>>()?;
        self.columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        self.rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(())
    }

    /// Drop duplicate rows over the keyed columns, keeping the first.
    pub fn dedup_by(&mut self, names: &[&str]) -> VigilResult<()> {
        let indices: Vec<usize> = names
            .iter()
            .map(|name| self.require_column(name))
            .collect::<VigilResult<_>>()?;
        let mut seen: HashSet<Vec<Value>> = HashSet::new();
        self.rows.retain(|row| {
            let key: Vec<Value> = indices.iter().map(|&i| row[i].clone()).collect();
            seen.insert(key)
        });
        Ok(())
    }
}
