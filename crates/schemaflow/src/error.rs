//! Error types for the schemaflow library.

use crate::parser::StatementKind;
use thiserror::Error;

/// Main error type for reconciliation operations.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Malformed SQL in a source file
    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// No current registry row for a named object. Callers must check
    /// `exists_by_name` first; hitting this is a contract violation.
    #[error("No registered {kind} named {name}")]
    NotFound { name: String, kind: StatementKind },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl Into<String>, context: impl Into<String>) -> Self {
        FlowError::Pool {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a Parse error for a source file
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        FlowError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            FlowError::Config(_) | FlowError::Yaml(_) | FlowError::Json(_) => 1,
            FlowError::Parse { .. } => 2,
            FlowError::Db(_) => 3,
            FlowError::Pool { .. } => 4,
            FlowError::NotFound { .. } => 5,
            FlowError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, FlowError>;
