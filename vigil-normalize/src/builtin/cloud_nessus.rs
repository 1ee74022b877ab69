//! Nessus variant for cloud assets without a resolvable host.

use vigil_core::constants::CLOUD_ASSETS_HOST;
use vigil_core::errors::VigilResult;
use vigil_core::types::AssessmentKind;

use crate::plugin::Normalizer;
use crate::schema::schema_columns;
use crate::table::{Table, Value};

/// Normalizer for Nessus exports covering unaddressable cloud assets.
///
/// Same pipeline as [`super::Nessus`], but every row is pinned to the
/// synthetic `Cloud_Assets` host on port 0, so identical findings across
/// many ephemeral assets collapse into one occurrence per plugin output.
pub struct CloudNessus;

impl Normalizer for CloudNessus {
    fn process(&self, raw: &[u8]) -> VigilResult<Table> {
        let mut table = super::nessus::base_transform(raw)?;
        table.map_column("host", |_| Value::Text(CLOUD_ASSETS_HOST.to_string()))?;
        table.map_column("port", |_| Value::Int(0))?;
        table.dedup_by(&["name", "description", "remediation"])?;
        table.select(&schema_columns(AssessmentKind::Va))?;
        Ok(table)
    }
}
