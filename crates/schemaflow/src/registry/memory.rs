//! In-memory statement registry.
//!
//! Backs the policy tests; the storage-level conflict clause becomes an
//! explicit check-then-insert, which is safe under the single-writer model.

use super::{RegisteredStatement, StatementStore};
use crate::error::{FlowError, Result};
use crate::parser::{ParsedStatement, StatementKind};
use async_trait::async_trait;
use std::sync::Mutex;

/// Statement registry held in memory.
#[derive(Default)]
pub struct MemoryStatementRegistry {
    rows: Mutex<Vec<RegisteredStatement>>,
}

impl MemoryStatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently registered.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StatementStore for MemoryStatementRegistry {
    async fn exists_by_hash(&self, hash: &str) -> Result<bool> {
        Ok(self.rows.lock().unwrap().iter().any(|r| r.hash == hash))
    }

    async fn exists_by_name(&self, name: &str, kind: StatementKind) -> Result<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.name.as_deref() == Some(name) && r.kind == kind))
    }

    async fn previous_text(&self, name: &str, kind: StatementKind) -> Result<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name.as_deref() == Some(name) && r.kind == kind)
            .map(|r| r.text.clone())
            .ok_or_else(|| FlowError::NotFound {
                name: name.to_string(),
                kind,
            })
    }

    async fn insert(&self, stmt: &ParsedStatement) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.hash == stmt.hash) {
            return Ok(());
        }
        rows.push(RegisteredStatement {
            text: stmt.text.clone(),
            hash: stmt.hash.clone(),
            kind: stmt.kind,
            name: stmt.name.clone(),
        });
        Ok(())
    }

    async fn replace(&self, stmt: &ParsedStatement) -> Result<()> {
        if let Some(name) = &stmt.name {
            self.rows
                .lock()
                .unwrap()
                .retain(|r| !(r.name.as_deref() == Some(name.as_str()) && r.kind == stmt.kind));
        }

        self.insert(stmt).await
    }

    async fn delete_by_hash(&self, hash: &str) -> Result<()> {
        self.rows.lock().unwrap().retain(|r| r.hash != hash);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<RegisteredStatement>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}
