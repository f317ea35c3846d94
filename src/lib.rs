//! # Banking Core
//!
//! A customer-account ledger and transaction engine: typed account variants
//! with fixed balance policies, a transfer protocol with compensation, and a
//! monthly interest scheduler, all over a pluggable durable store.
//!
//! ## Features
//!
//! - **Account variants**: Savings, Investment, Cheque, Money Market, and
//!   Certificate of Deposit, each with its own withdrawal and interest policy
//! - **Transaction log**: every balance change appends an immutable record;
//!   an account's balance always equals the sum of its record deltas
//! - **Transfers**: withdraw-then-deposit as one unit, with ownership checks,
//!   deadlock-free pair locking, and a compensating deposit on failure
//! - **Interest runs**: one bulk pass applying each account's accrual policy,
//!   continuing past per-account failures and reporting totals
//! - **Storage abstraction**: database-agnostic design with a trait-based
//!   store; the store is the single authority for balance-sensitive reads
//! - **Audit seam**: fire-and-forget event sink for openings, transfers, and
//!   administrative deletes
//!
//! ## Quick Start
//!
//! ```rust
//! use banking_core::{Caller, Customer, Ledger, OpeningRequest, TransferRequest};
//! use banking_core::utils::MemoryStore;
//! use banking_core::NullAuditSink;
//! use bigdecimal::BigDecimal;
//!
//! // The in-memory store is for tests and demos; production callers
//! // implement the LedgerStore trait over their own database.
//! // let mut ledger = Ledger::new(MemoryStore::new(), NullAuditSink);
//! ```

pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use traits::*;
pub use types::*;
