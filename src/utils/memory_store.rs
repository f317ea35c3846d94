//! In-memory store and audit sink for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ledger::account::Account;
use crate::traits::{AuditEvent, AuditSink, LedgerStore};
use crate::types::{LedgerError, LedgerResult, TransactionRecord};

/// In-memory ledger store
///
/// Accounts are stored as full snapshots (balance, variant state, embedded
/// history); the transaction log backing `list_transactions_for_account` is
/// kept separately in append order. Clones share the same maps.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    transactions: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.accounts.write().unwrap().clear();
        self.transactions.write().unwrap().clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(account_id).cloned())
    }

    async fn save_account(&mut self, account: &Account) -> LedgerResult<()> {
        self.accounts
            .write()
            .unwrap()
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn list_accounts_for_customer(&self, customer_id: &str) -> LedgerResult<Vec<Account>> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .filter(|account| account.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_all_accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.accounts.read().unwrap().values().cloned().collect())
    }

    async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()> {
        if self.accounts.write().unwrap().remove(account_id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(account_id.to_string()))
        }
    }

    async fn append_transaction(&mut self, record: &TransactionRecord) -> LedgerResult<()> {
        record.validate()?;
        let mut log = self.transactions.write().unwrap();
        if log.iter().any(|existing| existing.id == record.id) {
            return Err(LedgerError::Validation(format!(
                "Transaction record '{}' already exists",
                record.id
            )));
        }
        log.push(record.clone());
        Ok(())
    }

    async fn list_transactions_for_account(
        &self,
        account_id: &str,
    ) -> LedgerResult<Vec<TransactionRecord>> {
        let log = self.transactions.read().unwrap();
        let mut records: Vec<TransactionRecord> = log
            .iter()
            .filter(|record| record.account_id == account_id)
            .cloned()
            .collect();
        // Most recent first: newest insertion first, then a stable sort by
        // date keeps same-day records in that order.
        records.reverse();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

/// Audit sink that buffers events in memory for inspection in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> LedgerResult<()> {
        self.events.write().unwrap().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::AccountKind;
    use crate::types::{TransactionKind, TransactionStatus};
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn record_on(account_id: &str, id: &str, date: NaiveDate) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            account_id: account_id.to_string(),
            kind: TransactionKind::Deposit,
            amount: dec("10"),
            date,
            status: TransactionStatus::Completed,
        }
    }

    #[tokio::test]
    async fn round_trips_a_full_account_snapshot() {
        let mut store = MemoryStore::new();
        let mut account = Account::open(
            "INV_round".to_string(),
            "cust_1".to_string(),
            AccountKind::Investment,
            None,
        );
        account.deposit(&dec("600")).unwrap();
        account.withdraw(&dec("100")).unwrap();

        store.save_account(&account).await.unwrap();
        let reloaded = store.get_account("INV_round").await.unwrap().unwrap();
        assert_eq!(reloaded, account);
        assert_eq!(reloaded.balance, dec("500"));
        assert_eq!(reloaded.transactions.len(), 2);

        // Saving the same state again is an upsert, not an error.
        store.save_account(&account).await.unwrap();
        assert_eq!(store.list_all_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lists_transactions_most_recent_first() {
        let mut store = MemoryStore::new();
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();

        store
            .append_transaction(&record_on("ACC_1", "TXN_a", day(1)))
            .await
            .unwrap();
        store
            .append_transaction(&record_on("ACC_1", "TXN_b", day(5)))
            .await
            .unwrap();
        store
            .append_transaction(&record_on("ACC_1", "TXN_c", day(5)))
            .await
            .unwrap();
        store
            .append_transaction(&record_on("ACC_2", "TXN_d", day(9)))
            .await
            .unwrap();

        let records = store.list_transactions_for_account("ACC_1").await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        // Newest date first; same-day records in newest-insertion order.
        assert_eq!(ids, vec!["TXN_c", "TXN_b", "TXN_a"]);
    }

    #[tokio::test]
    async fn rejects_duplicate_and_invalid_appends() {
        let mut store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let record = record_on("ACC_1", "TXN_a", day);
        store.append_transaction(&record).await.unwrap();
        let err = store.append_transaction(&record).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let mut bad = record_on("ACC_1", "TXN_b", day);
        bad.amount = dec("0");
        let err = store.append_transaction(&bad).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(
            store
                .list_transactions_for_account("ACC_1")
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn delete_requires_an_existing_account() {
        let mut store = MemoryStore::new();
        let account = Account::open(
            "SAV_gone".to_string(),
            "cust_1".to_string(),
            AccountKind::Savings,
            None,
        );
        store.save_account(&account).await.unwrap();

        store.delete_account("SAV_gone").await.unwrap();
        let err = store.delete_account("SAV_gone").await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn filters_customer_accounts() {
        let mut store = MemoryStore::new();
        for (id, customer) in [("SAV_a", "alice"), ("CHQ_b", "alice"), ("SAV_c", "bob")] {
            let account = Account::open(
                id.to_string(),
                customer.to_string(),
                AccountKind::Savings,
                None,
            );
            store.save_account(&account).await.unwrap();
        }

        let alices = store.list_accounts_for_customer("alice").await.unwrap();
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|account| account.customer_id == "alice"));
    }
}
