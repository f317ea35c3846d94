//! Per-account mutation locks

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::types::{LedgerError, LedgerResult};

/// Registry handing out one async mutex per account identifier
///
/// Every balance-mutating path (deposit, withdraw, transfer, accrual) holds
/// the account's lock across the whole read-modify-write-persist sequence,
/// so two concurrent withdrawals cannot both pass the policy check against a
/// stale read. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct AccountLocks {
    inner: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutation lock for one account
    pub async fn acquire(&self, account_id: &str) -> LedgerResult<OwnedMutexGuard<()>> {
        Ok(self.entry(account_id)?.lock_owned().await)
    }

    /// Acquire the locks for a pair of accounts
    ///
    /// Locks are always taken in ascending identifier order, whichever way
    /// the pair is passed, so opposite-direction transfers over the same two
    /// accounts cannot deadlock.
    pub async fn acquire_pair(
        &self,
        first_id: &str,
        second_id: &str,
    ) -> LedgerResult<(OwnedMutexGuard<()>, OwnedMutexGuard<()>)> {
        if first_id <= second_id {
            let first = self.entry(first_id)?.lock_owned().await;
            let second = self.entry(second_id)?.lock_owned().await;
            Ok((first, second))
        } else {
            let second = self.entry(second_id)?.lock_owned().await;
            let first = self.entry(first_id)?.lock_owned().await;
            Ok((first, second))
        }
    }

    fn entry(&self, account_id: &str) -> LedgerResult<Arc<tokio::sync::Mutex<()>>> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Persistence("Account lock registry poisoned".to_string()))?;
        Ok(map
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }
}
