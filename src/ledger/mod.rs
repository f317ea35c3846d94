//! Ledger module containing account policies, opening, transfers, and accrual

pub mod account;
pub mod core;
pub mod factory;
pub mod scheduler;
pub mod transfer;

pub use account::*;
pub use core::*;
pub use factory::*;
pub use scheduler::*;
pub use transfer::*;
