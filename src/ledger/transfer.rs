//! Transfer engine: moving funds between two accounts as one unit

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::ledger::account::Account;
use crate::traits::{AuditAction, AuditEvent, AuditSink, AuditStatus, AuditTarget, LedgerStore};
use crate::types::{Caller, LedgerError, LedgerResult, TransactionRecord};
use crate::utils::locks::AccountLocks;
use crate::utils::validation::{validate_account_id, validate_amount, validate_description};

/// A transfer order: move `amount` from the source to the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source_id: String,
    pub destination_id: String,
    pub amount: BigDecimal,
    pub description: Option<String>,
}

impl TransferRequest {
    pub fn new(
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            destination_id: destination_id.into(),
            amount,
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Receipt for a completed transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub source_id: String,
    pub destination_id: String,
    pub amount: BigDecimal,
    /// WITHDRAWAL record appended to the source
    pub withdrawal: TransactionRecord,
    /// DEPOSIT record appended to the destination
    pub deposit: TransactionRecord,
}

/// Orchestrates a withdraw-then-deposit pair as a single logical operation
///
/// A request progresses REQUESTED -> AUTHORIZED -> WITHDRAWN -> DEPOSITED ->
/// RECORDED, or is REJECTED at the first failing precondition. Both account
/// locks are held for the whole execution, acquired in ascending id order.
/// If the destination cannot be persisted after the source debit is durable,
/// the withdrawn amount is restored to the source with a compensating
/// deposit; a failure of that restore surfaces as
/// `LedgerError::ReconciliationRequired`.
pub struct TransferEngine<S: LedgerStore, A: AuditSink> {
    pub(crate) store: S,
    audit: A,
    locks: AccountLocks,
}

impl<S: LedgerStore, A: AuditSink> TransferEngine<S, A> {
    pub fn new(store: S, audit: A, locks: AccountLocks) -> Self {
        Self {
            store,
            audit,
            locks,
        }
    }

    /// Execute a transfer on behalf of `caller`
    ///
    /// Preconditions are checked in order and the first failure
    /// short-circuits: amount and id validity, distinct accounts, both
    /// accounts resolvable, caller owns the source, and the source's own
    /// withdrawal policy. Rejections never mutate the store.
    pub async fn transfer(
        &mut self,
        caller: &Caller,
        request: TransferRequest,
    ) -> LedgerResult<TransferReceipt> {
        validate_amount(&request.amount)?;
        validate_account_id(&request.source_id)?;
        validate_account_id(&request.destination_id)?;
        if let Some(description) = &request.description {
            validate_description(description)?;
        }
        if request.source_id == request.destination_id {
            return Err(LedgerError::SameAccount);
        }

        let _guards = self
            .locks
            .acquire_pair(&request.source_id, &request.destination_id)
            .await?;

        let mut source = self
            .store
            .get_account(&request.source_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(request.source_id.clone()))?;
        let mut destination = self
            .store
            .get_account(&request.destination_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(request.destination_id.clone()))?;

        if source.customer_id != caller.id {
            self.emit_audit(
                caller,
                &request,
                AuditStatus::Denied,
                "Caller does not own the source account".to_string(),
            )
            .await;
            return Err(LedgerError::Unauthorized);
        }
        tracing::debug!(
            source = %source.id,
            destination = %destination.id,
            amount = %request.amount,
            "transfer authorized"
        );

        let withdrawal = source.withdraw(&request.amount)?;
        // Deposits cannot fail for a validated amount; if that ever changes,
        // nothing is durable at this point and the early return leaves the
        // store untouched.
        let deposit = destination.deposit(&request.amount)?;

        self.store.save_account(&source).await?;
        tracing::debug!(source = %source.id, "source debit persisted");

        if let Err(err) = self.store.save_account(&destination).await {
            self.compensate(
                &mut source,
                &request.amount,
                "destination account could not be persisted",
            )
            .await?;
            return Err(err);
        }
        tracing::debug!(destination = %destination.id, "destination credit persisted");

        if let Err(err) = self.store.append_transaction(&withdrawal).await {
            tracing::error!(
                record = %withdrawal.id,
                error = %err,
                "balances persisted but the withdrawal record was not appended"
            );
            return Err(err);
        }
        if let Err(err) = self.store.append_transaction(&deposit).await {
            tracing::error!(
                record = %deposit.id,
                error = %err,
                "balances persisted but the deposit record was not appended"
            );
            return Err(err);
        }

        let mut details = format!("Transferred {}", request.amount);
        if let Some(description) = &request.description {
            details.push_str(&format!(" ({description})"));
        }
        self.emit_audit(caller, &request, AuditStatus::Ok, details)
            .await;

        Ok(TransferReceipt {
            source_id: request.source_id,
            destination_id: request.destination_id,
            amount: request.amount,
            withdrawal,
            deposit,
        })
    }

    /// Restore a durably debited source after a downstream failure
    ///
    /// One immediate attempt, no retries: the reversal is applied in memory,
    /// persisted, and appended to the log. If the persist fails the caller
    /// gets `ReconciliationRequired` instead of the original error.
    async fn compensate(
        &mut self,
        source: &mut Account,
        amount: &BigDecimal,
        reason: &str,
    ) -> LedgerResult<()> {
        tracing::warn!(
            account_id = %source.id,
            amount = %amount,
            reason,
            "restoring withdrawn amount to the source account"
        );
        let reversal = source.compensating_deposit(amount);
        if let Err(err) = self.store.save_account(source).await {
            return Err(LedgerError::ReconciliationRequired {
                account_id: source.id.clone(),
                amount: amount.clone(),
                reason: format!("{reason}; compensating persist failed: {err}"),
            });
        }
        if let Err(err) = self.store.append_transaction(&reversal).await {
            tracing::error!(
                record = %reversal.id,
                error = %err,
                "source restored but the reversal record was not appended"
            );
        }
        Ok(())
    }

    async fn emit_audit(
        &self,
        caller: &Caller,
        request: &TransferRequest,
        status: AuditStatus,
        details: String,
    ) {
        let event = AuditEvent::new(
            caller.id.clone(),
            caller.label.clone(),
            AuditAction::Transfer,
            AuditTarget::Transaction,
            format!("{}->{}", request.source_id, request.destination_id),
            details,
            status,
        );
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(error = %err, "audit sink rejected transfer event");
        }
    }
}
