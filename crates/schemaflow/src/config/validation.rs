//! Configuration validation.

use super::Config;
use crate::error::{FlowError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Target validation
    if config.target.host.is_empty() {
        return Err(FlowError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(FlowError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(FlowError::Config("target.user is required".into()));
    }

    // Migration config validation
    if config.migration.sql_root.as_os_str().is_empty() {
        return Err(FlowError::Config("migration.sql_root is required".into()));
    }
    if config.migration.pool_size == 0 {
        return Err(FlowError::Config(
            "migration.pool_size must be at least 1".into(),
        ));
    }

    // The metadata schema is interpolated into SQL text, so it must be a
    // bare identifier.
    if !is_bare_identifier(&config.migration.metadata_schema) {
        return Err(FlowError::Config(format!(
            "migration.metadata_schema must be a plain identifier, got '{}'",
            config.migration.metadata_schema
        )));
    }

    Ok(())
}

fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
