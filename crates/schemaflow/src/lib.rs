//! # schemaflow
//!
//! Declarative schema management for PostgreSQL.
//!
//! This library reconciles SQL-defined database objects (functions, views,
//! procedures, triggers, types and one-off DDL) declared in `.sql` source
//! files against the live state recorded in a metadata schema inside the
//! target database, so that repeated runs apply only the statements that
//! actually changed:
//!
//! - **Content-hash identity** for statements and migration files
//! - **Minimal mutations**: unchanged statements are skipped entirely
//! - **Named-object revisions** replace exactly one registry row per
//!   `(name, kind)` pair
//! - **Idempotent re-runs** gated by a migration-file ledger
//!
//! ## Example
//!
//! ```rust,no_run
//! use schemaflow::{Config, Runner};
//!
//! #[tokio::main]
//! async fn main() -> schemaflow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let runner = Runner::new(config).await?;
//!     let summary = runner.run(false).await?;
//!     println!("Applied {} files", summary.files_applied);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod discover;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod parser;
pub mod reconcile;
pub mod registry;
pub mod runner;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, TargetConfig};
pub use db::Db;
pub use error::{FlowError, Result};
pub use ledger::{MigrationLog, MigrationRecord};
pub use parser::{ParsedStatement, StatementKind};
pub use reconcile::{classify, reconcile, Reconciliation};
pub use registry::{RegisteredStatement, StatementStore};
pub use runner::{HealthReport, RunSummary, Runner, StatusReport};
