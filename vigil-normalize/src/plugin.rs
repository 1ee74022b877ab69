//! Plugin contract and registry.

use std::collections::HashMap;
use std::sync::Arc;

use vigil_core::errors::VigilResult;
use vigil_core::types::AssessmentKind;

use crate::builtin;
use crate::table::Table;

/// A vendor-specific normalizer.
///
/// Implementations turn a raw export into a table matching the canonical
/// schema for their assessment kind. They must not perform I/O beyond
/// the bytes they are handed.
pub trait Normalizer: Send + Sync {
    fn process(&self, raw: &[u8]) -> VigilResult<Table>;
}

/// Resolves (assessment kind, plugin name) to a normalizer.
///
/// Plugin rows in the catalog carry the same (kind, name) pair, so the
/// registry is the single point where a stored plugin becomes runnable
/// code.
pub struct NormalizerRegistry {
    plugins: HashMap<(AssessmentKind, String), Arc<dyn Normalizer>>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        NormalizerRegistry {
            plugins: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the builtin vendor plugins.
    pub fn with_builtins() -> Self {
        let mut registry = NormalizerRegistry::new();
        registry.register(AssessmentKind::Va, "manual", Arc::new(builtin::ManualCsv));
        registry.register(AssessmentKind::Va, "nessus", Arc::new(builtin::Nessus));
        registry.register(
            AssessmentKind::Va,
            "cloud_nessus",
            Arc::new(builtin::CloudNessus),
        );
        registry.register(AssessmentKind::Va, "aws", Arc::new(builtin::AwsInspector));
        registry.register(AssessmentKind::Ha, "aws", Arc::new(builtin::AwsSecurityHub));
        registry
    }

    pub fn register(
        &mut self,
        kind: AssessmentKind,
        name: &str,
        normalizer: Arc<dyn Normalizer>,
    ) {
        self.plugins.insert((kind, name.to_string()), normalizer);
    }

    pub fn resolve(&self, kind: AssessmentKind, name: &str) -> Option<Arc<dyn Normalizer>> {
        self.plugins.get(&(kind, name.to_string())).cloned()
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        NormalizerRegistry::with_builtins()
    }
}
