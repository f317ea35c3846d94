//! Monthly interest and maturity batch processing

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::ledger::account::Account;
use crate::traits::LedgerStore;
use crate::types::{LedgerResult, TransactionRecord};
use crate::utils::locks::AccountLocks;

/// One account the batch could not process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualFailure {
    pub account_id: String,
    pub error: String,
}

/// Outcome of one scheduler run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccrualReport {
    /// Accounts the run looked at
    pub examined: usize,
    /// Accounts that received an interest credit
    pub accrued: usize,
    /// Accounts skipped (empty balance, no interest policy, or deleted
    /// between listing and processing)
    pub skipped: usize,
    /// Sum of all interest credited this run
    pub total_interest: BigDecimal,
    /// Per-account failures; the run continues past each one
    pub failures: Vec<AccrualFailure>,
}

impl AccrualReport {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }
}

/// Applies each account's periodic accrual policy across the whole store
///
/// The run iterates every account the store knows (never a cached subset),
/// re-reads each one under its mutation lock, accrues, and persists the
/// updated account plus its INTEREST record. One account's failure does not
/// abort the batch: it is logged, counted in the report, and the run moves
/// on. There is no "already accrued this period" guard; running the batch
/// twice in the same period compounds interest twice.
pub struct InterestScheduler<S: LedgerStore> {
    pub(crate) store: S,
    locks: AccountLocks,
}

impl<S: LedgerStore> InterestScheduler<S> {
    pub fn new(store: S, locks: AccountLocks) -> Self {
        Self { store, locks }
    }

    /// Run one accrual pass over every account in the store
    pub async fn run(&mut self) -> LedgerResult<AccrualReport> {
        let accounts = self.store.list_all_accounts().await?;
        let mut report = AccrualReport::default();

        for listed in accounts {
            report.examined += 1;
            let _guard = self.locks.acquire(&listed.id).await?;

            // The listing may be stale; the locked re-read is authoritative.
            let mut account = match self.store.get_account(&listed.id).await {
                Ok(Some(account)) => account,
                Ok(None) => {
                    report.skipped += 1;
                    continue;
                }
                Err(err) => {
                    tracing::error!(
                        account_id = %listed.id,
                        error = %err,
                        "could not re-read account for accrual"
                    );
                    report.failures.push(AccrualFailure {
                        account_id: listed.id.clone(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            let record = match account.accrue_interest() {
                Some(record) => record,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };

            if let Err(err) = self.persist(&account, &record).await {
                tracing::error!(
                    account_id = %account.id,
                    error = %err,
                    "interest accrual could not be persisted"
                );
                report.failures.push(AccrualFailure {
                    account_id: account.id.clone(),
                    error: err.to_string(),
                });
                continue;
            }

            report.accrued += 1;
            report.total_interest += &record.amount;
        }

        tracing::debug!(
            examined = report.examined,
            accrued = report.accrued,
            skipped = report.skipped,
            errors = report.error_count(),
            total_interest = %report.total_interest,
            "interest run complete"
        );
        Ok(report)
    }

    async fn persist(&mut self, account: &Account, record: &TransactionRecord) -> LedgerResult<()> {
        self.store.save_account(account).await?;
        self.store.append_transaction(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::AccountKind;
    use crate::types::{LedgerError, TransactionKind};
    use crate::utils::memory_store::MemoryStore;
    use async_trait::async_trait;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    async fn seed(store: &mut MemoryStore, id: &str, kind: AccountKind, balance: &str) {
        let mut account = Account::open(id.to_string(), "cust_1".to_string(), kind, None);
        if balance != "0" {
            account.deposit(&dec(balance)).unwrap();
        }
        store.save_account(&account).await.unwrap();
    }

    async fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        seed(&mut store, "INV_a", AccountKind::Investment, "1000").await;
        seed(
            &mut store,
            "CHQ_b",
            AccountKind::Cheque {
                employer: "Acme Pty Ltd".to_string(),
                employer_address: "12 Long St".to_string(),
            },
            "5000",
        )
        .await;
        seed(&mut store, "SAV_c", AccountKind::Savings, "0").await;
        store
    }

    #[tokio::test]
    async fn accrues_across_the_store_and_reports_totals() {
        let store = seeded_store().await;
        let mut scheduler = InterestScheduler::new(store.clone(), AccountLocks::new());

        let report = scheduler.run().await.unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.accrued, 1);
        assert_eq!(report.skipped, 2); // cheque pays nothing, savings is empty
        assert_eq!(report.total_interest, dec("50.00"));
        assert_eq!(report.error_count(), 0);

        let investment = store.get_account("INV_a").await.unwrap().unwrap();
        assert_eq!(investment.balance, dec("1050.00"));
        assert_eq!(investment.balance, investment.history_total());

        let log = store.list_transactions_for_account("INV_a").await.unwrap();
        let interest: Vec<_> = log
            .iter()
            .filter(|r| r.kind == TransactionKind::Interest)
            .collect();
        assert_eq!(interest.len(), 1);
        assert_eq!(interest[0].amount, dec("50.00"));

        let cheque = store.get_account("CHQ_b").await.unwrap().unwrap();
        assert_eq!(cheque.balance, dec("5000"));
    }

    #[tokio::test]
    async fn a_second_run_compounds_again() {
        let store = seeded_store().await;
        let mut scheduler = InterestScheduler::new(store.clone(), AccountLocks::new());

        scheduler.run().await.unwrap();
        let report = scheduler.run().await.unwrap();
        assert_eq!(report.total_interest, dec("52.50"));

        let investment = store.get_account("INV_a").await.unwrap().unwrap();
        assert_eq!(investment.balance, dec("1102.50"));
    }

    /// Store double whose save_account rejects one specific account
    #[derive(Clone)]
    struct RefusingStore {
        inner: MemoryStore,
        refused_id: String,
    }

    #[async_trait]
    impl LedgerStore for RefusingStore {
        async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
            self.inner.get_account(account_id).await
        }

        async fn save_account(&mut self, account: &Account) -> LedgerResult<()> {
            if account.id == self.refused_id {
                return Err(LedgerError::Persistence("write rejected".to_string()));
            }
            self.inner.save_account(account).await
        }

        async fn list_accounts_for_customer(
            &self,
            customer_id: &str,
        ) -> LedgerResult<Vec<Account>> {
            self.inner.list_accounts_for_customer(customer_id).await
        }

        async fn list_all_accounts(&self) -> LedgerResult<Vec<Account>> {
            self.inner.list_all_accounts().await
        }

        async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()> {
            self.inner.delete_account(account_id).await
        }

        async fn append_transaction(&mut self, record: &TransactionRecord) -> LedgerResult<()> {
            self.inner.append_transaction(record).await
        }

        async fn list_transactions_for_account(
            &self,
            account_id: &str,
        ) -> LedgerResult<Vec<TransactionRecord>> {
            self.inner.list_transactions_for_account(account_id).await
        }
    }

    #[tokio::test]
    async fn continues_past_a_failing_account() {
        let mut memory = MemoryStore::new();
        seed(&mut memory, "INV_a", AccountKind::Investment, "1000").await;
        seed(
            &mut memory,
            "MMA_b",
            AccountKind::MoneyMarket {
                withdrawals_this_month: 3,
            },
            "2000",
        )
        .await;

        let store = RefusingStore {
            inner: memory.clone(),
            refused_id: "INV_a".to_string(),
        };
        let mut scheduler = InterestScheduler::new(store, AccountLocks::new());

        let report = scheduler.run().await.unwrap();
        assert_eq!(report.examined, 2);
        assert_eq!(report.accrued, 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.failures[0].account_id, "INV_a");
        assert_eq!(report.total_interest, dec("160.00"));

        // The failed account keeps its pre-run state in the store.
        let investment = memory.get_account("INV_a").await.unwrap().unwrap();
        assert_eq!(investment.balance, dec("1000"));

        // The money market account accrued and its counter reset.
        let money_market = memory.get_account("MMA_b").await.unwrap().unwrap();
        assert_eq!(money_market.balance, dec("2160.00"));
        assert_eq!(money_market.withdrawals_this_month(), 0);
    }
}
