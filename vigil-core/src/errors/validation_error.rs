use chrono::NaiveDate;

/// Upload validation failures. Raised before any write, or while building
/// rows inside the ingestion transaction; always user-correctable.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("finding date {scan_date} cannot be a future date")]
    FutureScanDate { scan_date: NaiveDate },

    #[error("finding date must be greater than {last_update}")]
    StaleScanDate {
        scan_date: NaiveDate,
        last_update: NaiveDate,
    },

    #[error("invalid file type {content_type}: only csv uploads are supported")]
    UnsupportedFileType { content_type: String },

    #[error("plugin {plugin_id} is not registered")]
    UnknownPlugin { plugin_id: String },

    #[error("the selected plugin did not match the uploaded file: {reason}")]
    PluginMismatch { reason: String },

    #[error("canonical {kind} schema mismatch: missing {missing:?}, unexpected {unexpected:?}, mistyped {mistyped:?}")]
    SchemaMismatch {
        kind: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
        mistyped: Vec<String>,
    },

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("no revert point exists for product {product_id}")]
    NoRevertPoint { product_id: String },

    #[error("the revert point for product {product_id} no longer matches the latest ingestion")]
    StaleRevertPoint { product_id: String },
}
