//! # vigil-core
//!
//! Foundation crate for the Vigil finding tracker.
//! Defines the domain types, error taxonomy, and configuration shared by
//! every other crate in the workspace.

pub mod config;
pub mod constants;
pub mod errors;
pub mod telemetry;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::VigilConfig;
pub use errors::{VigilError, VigilResult};
pub use types::{
    AssessmentKind, CanonicalRecord, CveRecord, Finding, FindingName, FindingStatus,
    IngestionSummary, Priority, PriorityResult, Severity, UploadContext,
};
