//! # vigil-normalize
//!
//! Turns raw vendor scan exports into tables matching the canonical
//! interchange schema. Each supported scanner gets a [`Normalizer`]
//! plugin; the [`NormalizerRegistry`] resolves one from the assessment
//! kind plus the plugin name recorded on the catalog entry.
//!
//! The output contract is deliberately narrow: a schema-valid [`Table`]
//! whose rows convert losslessly into [`vigil_core::CanonicalRecord`]s.
//! Everything vendor-specific (column renames, filler values, host
//! resolution from resource tags) stays inside the plugin.

pub mod builtin;
pub mod csv_read;
pub mod plugin;
pub mod schema;
pub mod table;
pub mod text;

pub use plugin::{Normalizer, NormalizerRegistry};
pub use schema::{canonical_records, expected_schema, validate_schema};
pub use table::{Column, DType, Table, Value};
