//! Runtime configuration, loadable from TOML.

pub mod database_config;
pub mod defaults;
pub mod enrichment_config;

pub use database_config::DatabaseConfig;
pub use enrichment_config::EnrichmentConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{VigilError, VigilResult};

/// Top-level configuration. Every field has a default, so an empty document
/// is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    pub database: DatabaseConfig,
    pub enrichment: EnrichmentConfig,
}

impl VigilConfig {
    /// Parse a TOML document. Missing sections and keys fall back to
    /// defaults.
    pub fn from_toml_str(raw: &str) -> VigilResult<Self> {
        toml::from_str(raw).map_err(|e| VigilError::Config {
            reason: e.to_string(),
        })
    }

    /// Load configuration from a TOML file on disk.
    pub fn load(path: &std::path::Path) -> VigilResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| VigilError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&raw)
    }
}
