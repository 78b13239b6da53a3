//! PostgreSQL-backed migration ledger.

use super::{MigrationLog, MigrationRecord};
use crate::error::Result;
use async_trait::async_trait;
use deadpool_postgres::Transaction;

/// Migration ledger over the caller's transaction.
pub struct PgMigrationLedger<'a, 'c> {
    tx: &'a Transaction<'c>,
    schema: &'a str,
}

impl<'a, 'c> PgMigrationLedger<'a, 'c> {
    pub fn new(tx: &'a Transaction<'c>, schema: &'a str) -> Self {
        Self { tx, schema }
    }
}

#[async_trait]
impl MigrationLog for PgMigrationLedger<'_, '_> {
    async fn list_applied(&self) -> Result<Vec<MigrationRecord>> {
        let rows = self
            .tx
            .query(
                &format!(
                    "SELECT file_name, file_hash FROM {}.migrations",
                    self.schema
                ),
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| MigrationRecord {
                file_name: row.get(0),
                file_hash: row.get(1),
            })
            .collect())
    }

    async fn is_applied(&self, file_name: &str, current_hash: &str) -> Result<bool> {
        let row = self
            .tx
            .query_opt(
                &format!(
                    "SELECT 1 FROM {}.migrations WHERE file_name = $1 AND file_hash = $2",
                    self.schema
                ),
                &[&file_name, &current_hash],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn record(&self, file_name: &str, file_hash: &str) -> Result<()> {
        self.tx
            .execute(
                &format!(
                    "INSERT INTO {}.migrations (file_name, file_hash)
                     VALUES ($1, $2)
                     ON CONFLICT (file_name) DO UPDATE SET file_hash = EXCLUDED.file_hash",
                    self.schema
                ),
                &[&file_name, &file_hash],
            )
            .await?;
        Ok(())
    }
}
