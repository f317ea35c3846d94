//! Core types and data structures for the banking ledger

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of balance-affecting event captured by a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Funds credited to the account
    Deposit,
    /// Funds debited from the account
    Withdrawal,
    /// Interest credited by the accrual scheduler
    Interest,
}

impl TransactionKind {
    /// Wire/report tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Interest => "INTEREST",
        }
    }
}

/// Outcome tag carried by a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Ordinary completed operation
    Completed,
    /// System-initiated compensating entry restoring a failed transfer
    Reversal,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Reversal => "REVERSAL",
        }
    }
}

/// Immutable log entry for a single balance-affecting event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier (`TXN_<token>`)
    pub id: String,
    /// Account whose balance this record affects
    pub account_id: String,
    /// Kind of event
    pub kind: TransactionKind,
    /// Positive amount moved
    pub amount: BigDecimal,
    /// Date the event was applied
    pub date: NaiveDate,
    /// Outcome tag
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Create a record with a fresh identifier, dated today
    pub fn new(
        account_id: &str,
        kind: TransactionKind,
        amount: BigDecimal,
        status: TransactionStatus,
    ) -> Self {
        Self {
            id: format!("TXN_{}", Uuid::new_v4().simple()),
            account_id: account_id.to_string(),
            kind,
            amount,
            date: chrono::Utc::now().date_naive(),
            status,
        }
    }

    /// Signed effect on the owning account's balance
    pub fn signed_amount(&self) -> BigDecimal {
        match self.kind {
            TransactionKind::Deposit | TransactionKind::Interest => self.amount.clone(),
            TransactionKind::Withdrawal => -self.amount.clone(),
        }
    }

    /// Validate the record
    pub fn validate(&self) -> LedgerResult<()> {
        if self.id.is_empty() {
            return Err(LedgerError::Validation(
                "Transaction record requires an identifier".to_string(),
            ));
        }
        if self.account_id.is_empty() {
            return Err(LedgerError::Validation(
                "Transaction record requires an account identifier".to_string(),
            ));
        }
        if self.amount <= BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Transaction record amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Role assigned to a customer by the (external) access-control layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerRole {
    Admin,
    Teller,
    Customer,
}

/// Bank customer owning zero or more accounts
///
/// The `account_ids` list is a display cache only. The ledger store is the
/// authority for balance-sensitive reads; refresh the cache via
/// `Ledger::refresh_customer_accounts` rather than trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer identifier
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Role granted by the access-control layer
    pub role: CustomerRole,
    /// Whether registration has been approved
    pub approved: bool,
    /// Whether the customer is currently suspended
    pub suspended: bool,
    /// Cached identifiers of owned accounts (display hint, never authority)
    pub account_ids: Vec<String>,
}

impl Customer {
    /// Create a customer with default role and flags
    pub fn new(
        id: String,
        first_name: String,
        surname: String,
        address: String,
        phone: String,
        email: String,
    ) -> Self {
        Self {
            id,
            first_name,
            surname,
            address,
            phone,
            email,
            role: CustomerRole::Customer,
            approved: false,
            suspended: false,
            account_ids: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }

    /// Add an account identifier to the display cache
    pub fn link_account(&mut self, account_id: String) {
        if !self.account_ids.contains(&account_id) {
            self.account_ids.push(account_id);
        }
    }

    /// Caller identity for ledger operations performed by this customer
    pub fn as_caller(&self) -> Caller {
        Caller {
            id: self.id.clone(),
            label: self.email.clone(),
        }
    }
}

/// Identity of the caller as established by the (external) auth layer
///
/// The ledger trusts this value; verifying it is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caller {
    /// Customer identifier the caller acts as
    pub id: String,
    /// Human-readable label recorded in audit events
    pub label: String,
}

impl Caller {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Variant-specific rule that blocked a withdrawal
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("withdrawals are not permitted on this account")]
    WithdrawalsNotAllowed,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("withdrawal would drop the balance below the required minimum of {minimum}")]
    BelowMinimumBalance { minimum: BigDecimal },
    #[error("monthly withdrawal limit of {limit} reached")]
    WithdrawalLimitReached { limit: u32 },
    #[error("certificate has not matured; maturity date is {maturity_date}")]
    NotMatured { maturity_date: NaiveDate },
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error("minimum opening deposit not met: required {required}, offered {offered}")]
    MinimumNotMet {
        required: BigDecimal,
        offered: BigDecimal,
    },
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("unknown account type: {0}")]
    UnknownAccountType(String),
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("source and destination accounts are the same")]
    SameAccount,
    #[error("caller does not own the source account")]
    Unauthorized,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("manual reconciliation required for account {account_id}: failed to restore {amount} ({reason})")]
    ReconciliationRequired {
        account_id: String,
        amount: BigDecimal,
        reason: String,
    },
    #[error("audit sink failure: {0}")]
    Audit(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
