//! In-memory migration ledger.

use super::{MigrationLog, MigrationRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Migration ledger held in memory, used by tests.
#[derive(Default)]
pub struct MemoryMigrationLedger {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryMigrationLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MigrationLog for MemoryMigrationLedger {
    async fn list_applied(&self) -> Result<Vec<MigrationRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|(file_name, file_hash)| MigrationRecord {
                file_name: file_name.clone(),
                file_hash: file_hash.clone(),
            })
            .collect())
    }

    async fn is_applied(&self, file_name: &str, current_hash: &str) -> Result<bool> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(file_name)
            .is_some_and(|stored| stored == current_hash))
    }

    async fn record(&self, file_name: &str, file_hash: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(file_name.to_string(), file_hash.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_file_not_applied() {
        let ledger = MemoryMigrationLedger::new();
        assert!(!ledger.is_applied("001.sql", "abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_applied_after_record() {
        let ledger = MemoryMigrationLedger::new();
        ledger.record("001.sql", "abc").await.unwrap();
        assert!(ledger.is_applied("001.sql", "abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_changed_hash_means_not_applied() {
        let ledger = MemoryMigrationLedger::new();
        ledger.record("001.sql", "abc").await.unwrap();

        // Same name, different content hash: must re-apply, never an error.
        assert!(!ledger.is_applied("001.sql", "def").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_overwrites_stored_hash() {
        let ledger = MemoryMigrationLedger::new();
        ledger.record("001.sql", "abc").await.unwrap();
        ledger.record("001.sql", "def").await.unwrap();

        assert!(ledger.is_applied("001.sql", "def").await.unwrap());
        assert!(!ledger.is_applied("001.sql", "abc").await.unwrap());
        assert_eq!(ledger.list_applied().await.unwrap().len(), 1);
    }
}
