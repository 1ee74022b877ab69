use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::AssessmentKind;

/// A product registered in the tracker. Products own findings; their
/// administration lives outside the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A registered normalizer plugin identity. The upload path resolves the
/// plugin row by id, then looks up the matching normalizer by (kind, name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    pub id: Uuid,
    pub name: String,
    pub kind: AssessmentKind,
    pub created_at: DateTime<Utc>,
}
