//! Migration ledger: the metadata table of executed source files.
//!
//! The [`MigrationLog`] trait defines the interface for deciding whether a
//! file must be (re-)applied and for recording a successful application.
//! Implementations:
//!
//! - **PostgreSQL**: `PgMigrationLedger` in `pg.rs`, scoped to the caller's
//!   transaction
//! - **In-memory**: `MemoryMigrationLedger` in `memory.rs`, used by tests
//!
//! A file counts as applied only when a record exists under its name whose
//! stored hash equals the current on-disk hash. A changed file with the same
//! name is simply not-yet-applied; recording it again overwrites the stored
//! hash.

mod memory;
mod pg;

pub use memory::MemoryMigrationLedger;
pub use pg::PgMigrationLedger;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// A row in the migration ledger.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRecord {
    /// Source file name (unique key).
    pub file_name: String,

    /// Hex digest of the file contents at application time.
    pub file_hash: String,
}

/// Interface to the migrations table.
#[async_trait]
pub trait MigrationLog: Send + Sync {
    /// All recorded migrations. Order is irrelevant to correctness.
    async fn list_applied(&self) -> Result<Vec<MigrationRecord>>;

    /// Whether `file_name` was applied with exactly `current_hash`.
    async fn is_applied(&self, file_name: &str, current_hash: &str) -> Result<bool>;

    /// Record a successful application. Called only after every statement in
    /// the file has been reconciled, inside the same transaction, so a failed
    /// run leaves the file unrecorded.
    async fn record(&self, file_name: &str, file_hash: &str) -> Result<()>;
}
