//! Statement registry: the metadata table of all known statements.
//!
//! The [`StatementStore`] trait defines the interface the reconciliation
//! policy mutates the registry through. Implementations:
//!
//! - **PostgreSQL**: `PgStatementRegistry` in `pg.rs`, scoped to the caller's
//!   transaction
//! - **In-memory**: `MemoryStatementRegistry` in `memory.rs`, used by tests
//!
//! # Design Pattern
//!
//! This uses the Strategy pattern to decouple the reconciliation policy from
//! the backing store. The policy works with `&dyn StatementStore` without
//! knowing the concrete type, and the registry is the sole writable owner of
//! the statements table: nothing else issues queries against it.

mod memory;
mod pg;

pub use memory::MemoryStatementRegistry;
pub use pg::PgStatementRegistry;

use crate::error::Result;
use crate::parser::{ParsedStatement, StatementKind};
use async_trait::async_trait;
use serde::Serialize;

/// A row in the statement registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredStatement {
    /// Canonical statement text.
    pub text: String,

    /// Hex digest of the canonical text (unique key).
    pub hash: String,

    /// Category of the defined object.
    pub kind: StatementKind,

    /// Object name for replaceable kinds, `None` for anonymous statements.
    pub name: Option<String>,
}

/// Interface to the statements table.
///
/// All writes are expected to happen inside the transaction owned by the
/// enclosing run; the store itself never commits.
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// Whether a row with this content hash is present. The fast path that
    /// lets unchanged statements skip any mutation.
    async fn exists_by_hash(&self, hash: &str) -> Result<bool>;

    /// Whether a current row exists for this `(name, kind)` pair.
    async fn exists_by_name(&self, name: &str, kind: StatementKind) -> Result<bool>;

    /// Canonical text of the current row for `(name, kind)`.
    ///
    /// Fails with [`FlowError::NotFound`](crate::error::FlowError::NotFound)
    /// if no such row exists; callers must have checked `exists_by_name`.
    async fn previous_text(&self, name: &str, kind: StatementKind) -> Result<String>;

    /// Insert a statement row. Idempotent: a duplicate content hash is
    /// silently ignored, not an error.
    async fn insert(&self, stmt: &ParsedStatement) -> Result<()>;

    /// Replace the current row for a named statement: delete any row
    /// matching `(name, kind)`, then insert. The only path that removes a
    /// registry row by name; anonymous rows are never deleted by name.
    async fn replace(&self, stmt: &ParsedStatement) -> Result<()>;

    /// Remove a single row by content hash.
    async fn delete_by_hash(&self, hash: &str) -> Result<()>;

    /// All registry rows.
    async fn list(&self) -> Result<Vec<RegisteredStatement>>;
}
