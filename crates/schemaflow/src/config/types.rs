//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target database configuration (PostgreSQL).
    pub target: TargetConfig,

    /// Reconciliation behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Target database (PostgreSQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,
}

/// Reconciliation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Root directory scanned for `.sql` source files (default: "./sql").
    #[serde(default = "default_sql_root")]
    pub sql_root: PathBuf,

    /// Metadata schema holding the statements and migrations tables
    /// (default: "_schemaflow").
    #[serde(default = "default_metadata_schema")]
    pub metadata_schema: String,

    /// Connection pool size (default: 4).
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            sql_root: default_sql_root(),
            metadata_schema: default_metadata_schema(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_pg_port() -> u16 {
    5432
}

fn default_sql_root() -> PathBuf {
    PathBuf::from("./sql")
}

fn default_metadata_schema() -> String {
    "_schemaflow".to_string()
}

fn default_pool_size() -> usize {
    4
}
