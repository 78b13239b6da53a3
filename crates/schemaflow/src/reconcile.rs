//! Reconciliation policy: decide what a parsed statement is and apply the
//! minimal registry mutation.
//!
//! For each statement the policy asks, in order:
//!
//! 1. Is the content hash already registered? Then the statement is
//!    **unchanged** (identical to its own prior version, or byte-identical
//!    to something registered elsewhere) and nothing is mutated.
//! 2. Is it named, with a current `(name, kind)` row? Then it is a
//!    **revision**: the previous canonical text is fetched for diff/audit
//!    use and the row is replaced, leaving exactly one current row for that
//!    pair.
//! 3. Otherwise it is **added**.
//!
//! Hash identity is checked before name identity so unchanged content never
//! triggers a delete, even when re-parsed from a different source location.
//! The delete-then-insert of a revision is atomic with respect to the
//! `(name, kind)` uniqueness invariant because every store call runs inside
//! the transaction owned by the enclosing run.

use crate::error::Result;
use crate::parser::ParsedStatement;
use crate::registry::StatementStore;

/// Outcome of reconciling one statement against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Content hash already registered; no mutation issued.
    Unchanged,

    /// First sighting; the statement was inserted.
    Added,

    /// New version of a named object; its registry row was replaced.
    Revised {
        /// Canonical text of the version that was replaced.
        previous: String,
    },
}

/// Classify a statement without mutating the registry.
///
/// Used by dry runs; [`reconcile`] applies the mutation the classification
/// calls for.
pub async fn classify(
    store: &dyn StatementStore,
    stmt: &ParsedStatement,
) -> Result<Reconciliation> {
    if store.exists_by_hash(&stmt.hash).await? {
        return Ok(Reconciliation::Unchanged);
    }

    if let Some(name) = &stmt.name {
        if store.exists_by_name(name, stmt.kind).await? {
            let previous = store.previous_text(name, stmt.kind).await?;
            return Ok(Reconciliation::Revised { previous });
        }
    }

    Ok(Reconciliation::Added)
}

/// Reconcile one statement: classify it, then issue the corresponding
/// registry mutation.
pub async fn reconcile(
    store: &dyn StatementStore,
    stmt: &ParsedStatement,
) -> Result<Reconciliation> {
    let outcome = classify(store, stmt).await?;

    match &outcome {
        Reconciliation::Unchanged => {}
        Reconciliation::Added => store.insert(stmt).await?,
        Reconciliation::Revised { .. } => store.replace(stmt).await?,
    }

    Ok(outcome)
}
