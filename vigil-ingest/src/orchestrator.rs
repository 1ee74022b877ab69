//! Upload orchestration: content gate, plugin resolution, normalization,
//! then hand-off to the reconcile engine.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use vigil_core::errors::{ValidationError, VigilResult};
use vigil_core::types::{IngestionSummary, UploadContext};
use vigil_normalize::{canonical_records, NormalizerRegistry};

use crate::engine::ReconcileEngine;

/// One uploaded scan export, as received from the outer surface.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub product_id: Uuid,
    pub plugin_id: Uuid,
    pub scan_date: NaiveDate,
    /// MIME type declared by the uploader, e.g. `text/csv`.
    pub content_type: String,
    pub process_new_finding: bool,
    pub overwrite: bool,
    pub label: Option<String>,
    pub payload: Vec<u8>,
}

/// Drives one upload end to end. Stateless apart from the registry, so a
/// single instance serves all products.
pub struct UploadOrchestrator {
    engine: Arc<ReconcileEngine>,
    registry: NormalizerRegistry,
}

impl UploadOrchestrator {
    pub fn new(engine: Arc<ReconcileEngine>) -> Self {
        UploadOrchestrator {
            engine,
            registry: NormalizerRegistry::with_builtins(),
        }
    }

    pub fn with_registry(engine: Arc<ReconcileEngine>, registry: NormalizerRegistry) -> Self {
        UploadOrchestrator { engine, registry }
    }

    pub fn engine(&self) -> &ReconcileEngine {
        &self.engine
    }

    /// Validate, normalize, and reconcile one upload.
    pub fn ingest(&self, request: &UploadRequest) -> VigilResult<IngestionSummary> {
        check_content_type(&request.content_type)?;

        let plugin = self
            .engine
            .store()
            .get_plugin(request.plugin_id)?
            .ok_or_else(|| ValidationError::UnknownPlugin {
                plugin_id: request.plugin_id.to_string(),
            })?;
        let normalizer = self
            .registry
            .resolve(plugin.kind, &plugin.name)
            .ok_or_else(|| ValidationError::UnknownPlugin {
                plugin_id: format!("{} ({})", plugin.name, plugin.kind.as_str()),
            })?;

        tracing::debug!(
            product_id = %request.product_id,
            plugin = %plugin.name,
            kind = %plugin.kind.as_str(),
            bytes = request.payload.len(),
            "normalizing upload"
        );
        let table = normalizer.process(&request.payload)?;
        let records = canonical_records(&table, plugin.kind)?;

        let ctx = UploadContext {
            product_id: request.product_id,
            plugin_id: plugin.id,
            kind: plugin.kind,
            scan_date: request.scan_date,
            process_new_finding: request.process_new_finding,
            overwrite: request.overwrite,
            label: request.label.clone(),
        };
        self.engine.reconcile(&ctx, records)
    }

    /// Restore the product's snapshot, undoing its latest ingestion.
    pub fn revert(&self, product_id: Uuid) -> VigilResult<()> {
        self.engine.revert(product_id)
    }
}

/// Only csv payloads are accepted. The subtype is taken from after the
/// slash so both `text/csv` and `application/csv` pass.
fn check_content_type(content_type: &str) -> VigilResult<()> {
    let subtype = content_type
        .rsplit('/')
        .next()
        .unwrap_or(content_type)
        .trim();
    if subtype.eq_ignore_ascii_case("csv") {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedFileType {
            content_type: content_type.to_string(),
        }
        .into())
    }
}
