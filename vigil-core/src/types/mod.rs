pub mod assessment;
pub mod canonical;
pub mod catalog;
pub mod cve;
pub mod finding;
pub mod priority;
pub mod severity;
pub mod status;
pub mod upload;

pub use assessment::AssessmentKind;
pub use canonical::CanonicalRecord;
pub use catalog::{PluginSpec, Product};
pub use cve::CveRecord;
pub use finding::{Finding, FindingName};
pub use priority::{Priority, PriorityResult};
pub use severity::Severity;
pub use status::FindingStatus;
pub use upload::{IngestionSummary, UploadContext};
