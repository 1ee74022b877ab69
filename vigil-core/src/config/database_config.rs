use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// SQLite database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::DEFAULT_DB_PATH),
        }
    }
}
