//! Ledger facade coordinating opening, transfers, and interest runs

use bigdecimal::BigDecimal;

use crate::ledger::account::Account;
use crate::ledger::factory::{AccountFactory, OpeningRequest};
use crate::ledger::scheduler::{AccrualReport, InterestScheduler};
use crate::ledger::transfer::{TransferEngine, TransferReceipt, TransferRequest};
use crate::traits::{AuditAction, AuditEvent, AuditSink, AuditStatus, AuditTarget, LedgerStore};
use crate::types::{Caller, Customer, LedgerError, LedgerResult, TransactionRecord};
use crate::utils::locks::AccountLocks;

/// Facade over the account factory, transfer engine, and interest scheduler
///
/// All components share one store handle and one per-account lock registry,
/// so every balance-mutating path serializes on the same locks. The store is
/// the single authority for balance-sensitive reads: every read path here
/// queries it directly rather than trusting any in-memory cache.
///
/// `S` must clone into handles over the same backing store (the in-memory
/// implementation and connection-pool-backed stores both behave this way).
pub struct Ledger<S: LedgerStore, A: AuditSink> {
    store: S,
    audit: A,
    locks: AccountLocks,
    factory: AccountFactory<S, A>,
    engine: TransferEngine<S, A>,
    scheduler: InterestScheduler<S>,
}

impl<S: LedgerStore + Clone, A: AuditSink + Clone> Ledger<S, A> {
    /// Create a ledger over the given store and audit sink
    pub fn new(store: S, audit: A) -> Self {
        let locks = AccountLocks::new();
        Self {
            factory: AccountFactory::new(store.clone(), audit.clone()),
            engine: TransferEngine::new(store.clone(), audit.clone(), locks.clone()),
            scheduler: InterestScheduler::new(store.clone(), locks.clone()),
            store,
            audit,
            locks,
        }
    }

    /// Open a validated account for the customer
    pub async fn open_account(
        &mut self,
        customer: &mut Customer,
        request: OpeningRequest,
    ) -> LedgerResult<Account> {
        self.factory.open(customer, request).await
    }

    /// Credit an account and persist the result
    pub async fn deposit(
        &mut self,
        account_id: &str,
        amount: &BigDecimal,
    ) -> LedgerResult<TransactionRecord> {
        let _guard = self.locks.acquire(account_id).await?;
        let mut account = self.account_required(account_id).await?;
        let record = account.deposit(amount)?;
        self.store.save_account(&account).await?;
        self.store.append_transaction(&record).await?;
        Ok(record)
    }

    /// Debit an account under its variant policy and persist the result
    pub async fn withdraw(
        &mut self,
        account_id: &str,
        amount: &BigDecimal,
    ) -> LedgerResult<TransactionRecord> {
        let _guard = self.locks.acquire(account_id).await?;
        let mut account = self.account_required(account_id).await?;
        let record = account.withdraw(amount)?;
        self.store.save_account(&account).await?;
        self.store.append_transaction(&record).await?;
        Ok(record)
    }

    /// Move funds between two accounts as one unit
    pub async fn transfer(
        &mut self,
        caller: &Caller,
        request: TransferRequest,
    ) -> LedgerResult<TransferReceipt> {
        self.engine.transfer(caller, request).await
    }

    /// Run one interest/maturity pass over every account in the store
    pub async fn process_monthly_interest(&mut self) -> LedgerResult<AccrualReport> {
        self.scheduler.run().await
    }

    /// Look up an account by id
    pub async fn account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.store.get_account(account_id).await
    }

    /// Look up an account that must exist
    pub async fn account_required(&self, account_id: &str) -> LedgerResult<Account> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    /// All accounts a customer owns, straight from the store
    pub async fn accounts_for_customer(&self, customer_id: &str) -> LedgerResult<Vec<Account>> {
        self.store.list_accounts_for_customer(customer_id).await
    }

    /// Re-fetch the customer's accounts and rebuild the display cache
    pub async fn refresh_customer_accounts(&self, customer: &mut Customer) -> LedgerResult<()> {
        let accounts = self.accounts_for_customer(&customer.id).await?;
        customer.account_ids = accounts.into_iter().map(|account| account.id).collect();
        Ok(())
    }

    /// Sum of the customer's balances, always computed from the store
    pub async fn total_balance(&self, customer_id: &str) -> LedgerResult<BigDecimal> {
        let accounts = self.accounts_for_customer(customer_id).await?;
        Ok(accounts
            .into_iter()
            .map(|account| account.balance)
            .sum())
    }

    /// An account's transaction records, most recent first
    pub async fn transaction_history(
        &self,
        account_id: &str,
    ) -> LedgerResult<Vec<TransactionRecord>> {
        self.store.list_transactions_for_account(account_id).await
    }

    /// Administratively remove an account from the store
    ///
    /// The only path that physically deletes an account. Emits a
    /// DELETE_ACCOUNT audit event naming the acting principal.
    pub async fn delete_account(&mut self, actor: &Caller, account_id: &str) -> LedgerResult<()> {
        let _guard = self.locks.acquire(account_id).await?;
        self.store.delete_account(account_id).await?;

        let event = AuditEvent::new(
            actor.id.clone(),
            actor.label.clone(),
            AuditAction::DeleteAccount,
            AuditTarget::Account,
            account_id,
            "Account removed from the ledger store",
            AuditStatus::Ok,
        );
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(account_id, error = %err, "audit sink rejected delete-account event");
        }
        Ok(())
    }
}
