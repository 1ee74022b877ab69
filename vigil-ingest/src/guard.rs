//! In-process reservation serializing reconciliation per (product, plugin).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use vigil_core::errors::VigilResult;
use vigil_core::VigilError;

/// Tracks the (product, plugin) pairs currently reconciling. Acquiring
/// an already-held pair fails instead of waiting: an interleaved upload
/// for the same pair could not produce a meaningful summary anyway.
#[derive(Debug, Default)]
pub struct ReconcileGuard {
    active: DashMap<(Uuid, Uuid), ()>,
}

impl ReconcileGuard {
    pub fn new() -> Self {
        ReconcileGuard {
            active: DashMap::new(),
        }
    }

    /// Reserve the pair for the lifetime of the returned permit.
    pub fn acquire(&self, product_id: Uuid, plugin_id: Uuid) -> VigilResult<ReconcilePermit<'_>> {
        let key = (product_id, plugin_id);
        match self.active.entry(key) {
            Entry::Occupied(_) => Err(VigilError::ReconcileInProgress {
                product_id: product_id.to_string(),
                plugin_id: plugin_id.to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(());
                Ok(ReconcilePermit { guard: self, key })
            }
        }
    }
}

/// RAII permit; dropping it releases the reservation.
#[derive(Debug)]
pub struct ReconcilePermit<'a> {
    guard: &'a ReconcileGuard,
    key: (Uuid, Uuid),
}

impl Drop for ReconcilePermit<'_> {
    fn drop(&mut self) {
        self.guard.active.remove(&self.key);
    }
}
