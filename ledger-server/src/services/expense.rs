//! External simple-ledger client
//!
//! The expense ledger is an external service; the engine only needs
//! upsert/delete keyed by (order, entry type) plus lookups for
//! reconciliation checks.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::{LedgerEntry, LedgerEntryKey};
use std::sync::Arc;

use crate::db::repository::RepoResult;

/// Boundary to the external expense ledger
#[async_trait]
pub trait ExpenseLedgerClient: Send + Sync {
    /// Insert or replace the entry for its (order, type) key
    async fn upsert(&self, entry: LedgerEntry) -> RepoResult<()>;

    /// Remove the entry for a key; absent keys are a no-op
    async fn delete(&self, key: LedgerEntryKey) -> RepoResult<()>;

    async fn get(&self, key: LedgerEntryKey) -> RepoResult<Option<LedgerEntry>>;

    /// Every live entry for one order
    async fn list_for_order(&self, order_id: i64) -> RepoResult<Vec<LedgerEntry>>;
}

/// In-memory expense ledger (tests / local runs)
#[derive(Debug, Clone, Default)]
pub struct InMemoryExpenseLedger {
    entries: Arc<DashMap<LedgerEntryKey, LedgerEntry>>,
}

impl InMemoryExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ExpenseLedgerClient for InMemoryExpenseLedger {
    async fn upsert(&self, entry: LedgerEntry) -> RepoResult<()> {
        self.entries.insert(entry.key(), entry);
        Ok(())
    }

    async fn delete(&self, key: LedgerEntryKey) -> RepoResult<()> {
        self.entries.remove(&key);
        Ok(())
    }

    async fn get(&self, key: LedgerEntryKey) -> RepoResult<Option<LedgerEntry>> {
        Ok(self.entries.get(&key).map(|e| e.clone()))
    }

    async fn list_for_order(&self, order_id: i64) -> RepoResult<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.order_id == order_id)
            .map(|e| e.clone())
            .collect())
    }
}
