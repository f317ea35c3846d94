//! Traits for storage abstraction and audit integration

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ledger::account::Account;
use crate::types::*;

/// Storage abstraction for the ledger system
///
/// This trait allows the banking core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these
/// methods. The store is the single authority for balance-sensitive reads:
/// the core always re-fetches accounts through it rather than trusting
/// in-memory caches.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get an account by ID
    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>>;

    /// Save the full account snapshot (upsert, idempotent for the same state)
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// List all accounts owned by a customer
    async fn list_accounts_for_customer(&self, customer_id: &str) -> LedgerResult<Vec<Account>>;

    /// List every account in the store (interest runs, cross-account lookups)
    async fn list_all_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// Delete an account; missing accounts are an error
    async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()>;

    /// Append a transaction record to the immutable log
    async fn append_transaction(&mut self, record: &TransactionRecord) -> LedgerResult<()>;

    /// List an account's transaction records, most recent first
    async fn list_transactions_for_account(
        &self,
        account_id: &str,
    ) -> LedgerResult<Vec<TransactionRecord>>;
}

/// Action recorded in an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    OpenAccount,
    Transfer,
    DeleteAccount,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::OpenAccount => "OPEN_ACCOUNT",
            AuditAction::Transfer => "TRANSFER",
            AuditAction::DeleteAccount => "DELETE_ACCOUNT",
        }
    }
}

/// Entity class an audit event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditTarget {
    Customer,
    Account,
    Transaction,
    System,
}

impl AuditTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditTarget::Customer => "CUSTOMER",
            AuditTarget::Account => "ACCOUNT",
            AuditTarget::Transaction => "TRANSACTION",
            AuditTarget::System => "SYSTEM",
        }
    }
}

/// Outcome recorded in an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditStatus {
    Ok,
    Denied,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Ok => "OK",
            AuditStatus::Denied => "DENIED",
        }
    }
}

/// One audit trail entry pushed to the sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Identifier of the acting customer or system principal
    pub actor_id: String,
    /// Human-readable actor label (name, email)
    pub actor_label: String,
    pub action: AuditAction,
    pub target: AuditTarget,
    /// Identifier of the affected entity (`source->dest` for transfers)
    pub target_id: String,
    pub details: String,
    pub status: AuditStatus,
    pub occurred_at: NaiveDateTime,
}

impl AuditEvent {
    /// Create an event stamped with the current time
    pub fn new(
        actor_id: impl Into<String>,
        actor_label: impl Into<String>,
        action: AuditAction,
        target: AuditTarget,
        target_id: impl Into<String>,
        details: impl Into<String>,
        status: AuditStatus,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            actor_label: actor_label.into(),
            action,
            target,
            target_id: target_id.into(),
            details: details.into(),
            status,
            occurred_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Sink the ledger pushes audit events to
///
/// Recording is fire-and-forget from the ledger's perspective: a sink
/// failure is logged and swallowed, never blocking or rolling back the
/// financial operation that produced the event.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one audit event
    async fn record(&self, event: AuditEvent) -> LedgerResult<()>;
}

/// No-op sink used when no audit integration is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn record(&self, _event: AuditEvent) -> LedgerResult<()> {
        Ok(())
    }
}
