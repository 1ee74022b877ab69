//! ReconcileEngine — the transactional heart of ingestion.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use vigil_core::errors::{StorageError, ValidationError, VigilResult};
use vigil_core::types::{AssessmentKind, CanonicalRecord, IngestionSummary, UploadContext};
use vigil_core::VigilError;
use vigil_store::queries::{cve_ops, finding_name_ops, finding_ops, revert_ops};
use vigil_store::queries::finding_ops::UpsertOutcome;
use vigil_store::StoreEngine;

use crate::guard::ReconcileGuard;
use crate::pipeline;
use crate::validation;

fn tx_err(stage: &str, e: rusqlite::Error) -> VigilError {
    StorageError::SqliteError {
        message: format!("{stage}: {e}"),
    }
    .into()
}

/// Runs the reconciliation steps as one all-or-nothing transaction,
/// serialized per (product, plugin) by an in-process guard.
pub struct ReconcileEngine {
    store: Arc<StoreEngine>,
    guard: ReconcileGuard,
}

impl ReconcileEngine {
    pub fn new(store: Arc<StoreEngine>) -> Self {
        ReconcileEngine {
            store,
            guard: ReconcileGuard::new(),
        }
    }

    pub fn store(&self) -> &StoreEngine {
        &self.store
    }

    /// Reconcile one upload's canonical rows against the product's
    /// recorded findings.
    pub fn reconcile(
        &self,
        ctx: &UploadContext,
        records: Vec<CanonicalRecord>,
    ) -> VigilResult<IngestionSummary> {
        let _permit = self.guard.acquire(ctx.product_id, ctx.plugin_id)?;

        let summary = self.store.with_writer(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| tx_err("reconcile begin", e))?;
            match run_reconcile(&tx, ctx, records) {
                Ok(summary) => {
                    tx.commit().map_err(|e| tx_err("reconcile commit", e))?;
                    Ok(summary)
                }
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })?;

        tracing::info!(
            product_id = %ctx.product_id,
            plugin_id = %ctx.plugin_id,
            scan_date = %ctx.scan_date,
            created = summary.created,
            updated = summary.updated,
            closed = summary.closed,
            reopened = summary.reopened,
            "reconciled upload"
        );
        Ok(summary)
    }

    /// Undo the most recent ingestion for a product by restoring its
    /// snapshot. Consumes the snapshot on success.
    pub fn revert(&self, product_id: Uuid) -> VigilResult<()> {
        self.store.with_writer(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| tx_err("revert begin", e))?;
            match run_revert(&tx, product_id) {
                Ok(()) => tx.commit().map_err(|e| tx_err("revert commit", e)),
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })?;
        tracing::info!(product_id = %product_id, "reverted to snapshot");
        Ok(())
    }
}

fn run_reconcile(
    conn: &Connection,
    ctx: &UploadContext,
    mut records: Vec<CanonicalRecord>,
) -> VigilResult<IngestionSummary> {
    let today = Utc::now().date_naive();
    let max_last_update = finding_ops::max_last_update(conn, ctx.product_id, ctx.plugin_id)?;
    validation::validate_dates(ctx, max_last_update, today)?;

    let mut summary = IngestionSummary::default();

    // step 1: snapshot the product, then clear this day's prior rows
    if ctx.overwrite {
        let captured = revert_ops::snapshot_product(conn, ctx.product_id)?;
        let dropped = finding_ops::delete_same_day(conn, ctx.product_id, ctx.scan_date)?;
        tracing::debug!(
            product_id = %ctx.product_id,
            captured,
            dropped,
            "overwrite snapshot taken"
        );
    }

    if ctx.kind == AssessmentKind::Ha {
        pipeline::prenormalize_ha(&mut records);
    }

    // step 2: without new-finding processing, keep only known triples
    if ctx.kind == AssessmentKind::Va && !ctx.process_new_finding {
        let known = finding_ops::known_triples(conn, ctx.product_id)?;
        pipeline::retain_known(&mut records, &known);
    }

    // step 3: finding identities
    for finding_name in pipeline::group_finding_names(&records, ctx.product_id) {
        finding_name_ops::insert_ignore(conn, &finding_name)?;
    }
    let name_ids = finding_name_ops::name_ids(conn, ctx.product_id)?;

    // step 4: CVE rows
    if ctx.kind == AssessmentKind::Va {
        for cve in pipeline::group_cves(&records, &name_ids)? {
            cve_ops::insert_ignore(conn, &cve)?;
        }
    }

    // steps 5 + 6: finalize and upsert
    for finding in pipeline::finalize_rows(&records, ctx, &name_ids)? {
        match finding_ops::upsert_finding(conn, &finding, ctx.kind)? {
            UpsertOutcome::Created => summary.created += 1,
            UpsertOutcome::Updated => summary.updated += 1,
        }
    }

    // step 7: rows still on their discovery date go back to NEW
    if ctx.kind == AssessmentKind::Va {
        finding_ops::first_seen_correction(conn, ctx.product_id, ctx.plugin_id)?;
    }

    // step 8: everything this upload did not reconfirm is closed
    summary.closed =
        finding_ops::close_sweep(conn, ctx.product_id, ctx.plugin_id, ctx.scan_date, ctx.kind)?;

    // step 9: flag groups that came back after a closure
    if ctx.kind == AssessmentKind::Va {
        summary.reopened = finding_ops::reopen_sweep(conn, ctx.product_id, ctx.plugin_id)?;
    }

    Ok(summary)
}

fn run_revert(conn: &Connection, product_id: Uuid) -> VigilResult<()> {
    if !revert_ops::has_snapshot(conn, product_id)? {
        return Err(ValidationError::NoRevertPoint {
            product_id: product_id.to_string(),
        }
        .into());
    }

    // only the ingestion the snapshot belongs to may be undone: the live
    // set must have been written at or after the snapshot was taken
    let snapshot_max = revert_ops::snapshot_max_last_update(conn, product_id)?;
    let live_max = finding_ops::max_last_update_product(conn, product_id)?;
    let current = match (live_max, snapshot_max) {
        (Some(live), Some(snap)) => live >= snap,
        _ => false,
    };
    if !current {
        return Err(ValidationError::StaleRevertPoint {
            product_id: product_id.to_string(),
        }
        .into());
    }

    revert_ops::restore_product(conn, product_id)?;
    Ok(())
}
