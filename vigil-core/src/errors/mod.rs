//! Error taxonomy for the workspace.
//!
//! Each subsystem gets its own enum; `VigilError` is the umbrella every
//! public operation returns.

pub mod enrich_error;
pub mod storage_error;
pub mod validation_error;

pub use enrich_error::EnrichError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;

/// Workspace-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Concurrent reconciliation attempt on a (product, plugin) pair that is
    /// already being ingested.
    #[error("an ingestion for product {product_id} / plugin {plugin_id} is already in progress")]
    ReconcileInProgress {
        product_id: String,
        plugin_id: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Enrich(#[from] EnrichError),

    #[error("configuration error: {reason}")]
    Config { reason: String },
}

pub type VigilResult<T> = Result<T, VigilError>;
