//! PostgreSQL-backed statement registry.

use super::{RegisteredStatement, StatementStore};
use crate::error::{FlowError, Result};
use crate::parser::{ParsedStatement, StatementKind};
use async_trait::async_trait;
use deadpool_postgres::Transaction;

/// Statement registry over the caller's transaction.
///
/// Reads see the transaction's own writes, so a statement inserted earlier
/// in the run is recognized as unchanged when it recurs in a later file.
pub struct PgStatementRegistry<'a, 'c> {
    tx: &'a Transaction<'c>,
    schema: &'a str,
}

impl<'a, 'c> PgStatementRegistry<'a, 'c> {
    pub fn new(tx: &'a Transaction<'c>, schema: &'a str) -> Self {
        Self { tx, schema }
    }
}

#[async_trait]
impl StatementStore for PgStatementRegistry<'_, '_> {
    async fn exists_by_hash(&self, hash: &str) -> Result<bool> {
        let row = self
            .tx
            .query_opt(
                &format!(
                    "SELECT 1 FROM {}.statements WHERE stmt_hash = $1",
                    self.schema
                ),
                &[&hash],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn exists_by_name(&self, name: &str, kind: StatementKind) -> Result<bool> {
        let row = self
            .tx
            .query_opt(
                &format!(
                    "SELECT 1 FROM {}.statements WHERE stmt_name = $1 AND stmt_type = $2 LIMIT 1",
                    self.schema
                ),
                &[&name, &kind.code()],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn previous_text(&self, name: &str, kind: StatementKind) -> Result<String> {
        let row = self
            .tx
            .query_opt(
                &format!(
                    "SELECT stmt FROM {}.statements WHERE stmt_name = $1 AND stmt_type = $2 LIMIT 1",
                    self.schema
                ),
                &[&name, &kind.code()],
            )
            .await?;

        match row {
            Some(row) => Ok(row.get(0)),
            None => Err(FlowError::NotFound {
                name: name.to_string(),
                kind,
            }),
        }
    }

    async fn insert(&self, stmt: &ParsedStatement) -> Result<()> {
        self.tx
            .execute(
                &format!(
                    "INSERT INTO {}.statements (stmt, stmt_hash, stmt_type, stmt_name)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (stmt_hash) DO NOTHING",
                    self.schema
                ),
                &[&stmt.text, &stmt.hash, &stmt.kind.code(), &stmt.name],
            )
            .await?;
        Ok(())
    }

    async fn replace(&self, stmt: &ParsedStatement) -> Result<()> {
        if let Some(name) = &stmt.name {
            self.tx
                .execute(
                    &format!(
                        "DELETE FROM {}.statements WHERE stmt_name = $1 AND stmt_type = $2",
                        self.schema
                    ),
                    &[name, &stmt.kind.code()],
                )
                .await?;
        }

        self.insert(stmt).await
    }

    async fn delete_by_hash(&self, hash: &str) -> Result<()> {
        self.tx
            .execute(
                &format!(
                    "DELETE FROM {}.statements WHERE stmt_hash = $1",
                    self.schema
                ),
                &[&hash],
            )
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<RegisteredStatement>> {
        let rows = self
            .tx
            .query(
                &format!(
                    "SELECT stmt, stmt_hash, stmt_type, stmt_name FROM {}.statements",
                    self.schema
                ),
                &[],
            )
            .await?;

        let mut statements = Vec::with_capacity(rows.len());
        for row in rows {
            let code: i32 = row.get(2);
            statements.push(RegisteredStatement {
                text: row.get(0),
                hash: row.get(1),
                kind: StatementKind::from_code(code)?,
                name: row.get(3),
            });
        }

        Ok(statements)
    }
}
