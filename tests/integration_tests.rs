//! Integration tests for banking-core

use banking_core::utils::{MemoryAuditSink, MemoryStore};
use banking_core::{
    AccountType, AuditAction, AuditStatus, Caller, Customer, Ledger, LedgerError, OpeningRequest,
    PolicyViolation, TransactionKind, TransferRequest,
};
use bigdecimal::BigDecimal;

fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

fn customer(id: &str, first: &str, last: &str) -> Customer {
    Customer::new(
        id.to_string(),
        first.to_string(),
        last.to_string(),
        "1 Bank St".to_string(),
        "021-555-0100".to_string(),
        format!("{id}@example.com"),
    )
}

#[tokio::test]
async fn complete_banking_workflow() {
    let store = MemoryStore::new();
    let audit = MemoryAuditSink::new();
    let mut ledger = Ledger::new(store, audit.clone());

    let mut alice = customer("alice", "Alice", "Mokoena");
    let mut bob = customer("bob", "Bob", "van Wyk");

    // Alice opens an investment account with the opening deposit applied.
    let alice_investment = ledger
        .open_account(
            &mut alice,
            OpeningRequest::new(AccountType::Investment).initial_deposit(dec("1000.00")),
        )
        .await
        .unwrap();
    assert!(alice_investment.id.starts_with("INV_"));
    assert_eq!(alice_investment.balance, dec("1000.00"));

    // Bob opens a cheque account funded with 200.
    let bob_cheque = ledger
        .open_account(
            &mut bob,
            OpeningRequest::new(AccountType::Cheque)
                .employer("Initech", "4120 Freidrich Ln")
                .initial_deposit(dec("200.00")),
        )
        .await
        .unwrap();
    assert!(bob_cheque.id.starts_with("CHQ_"));

    // Alice moves 300 to Bob.
    let receipt = ledger
        .transfer(
            &alice.as_caller(),
            TransferRequest::new(&alice_investment.id, &bob_cheque.id, dec("300.00"))
                .description("rent share"),
        )
        .await
        .unwrap();
    assert_eq!(receipt.withdrawal.amount, dec("300.00"));
    assert_eq!(receipt.deposit.amount, dec("300.00"));

    let alice_after = ledger.account_required(&alice_investment.id).await.unwrap();
    let bob_after = ledger.account_required(&bob_cheque.id).await.unwrap();
    assert_eq!(alice_after.balance, dec("700.00"));
    assert_eq!(bob_after.balance, dec("500.00"));

    // Exactly one withdrawal on the source and one deposit leg on the
    // destination beyond its opening deposit.
    let source_log = ledger
        .transaction_history(&alice_investment.id)
        .await
        .unwrap();
    assert_eq!(
        source_log
            .iter()
            .filter(|r| r.kind == TransactionKind::Withdrawal)
            .count(),
        1
    );
    let destination_log = ledger.transaction_history(&bob_cheque.id).await.unwrap();
    assert_eq!(
        destination_log
            .iter()
            .filter(|r| r.kind == TransactionKind::Deposit)
            .count(),
        2
    );

    // One interest run: 5% on Alice's 700, nothing on the cheque account.
    let report = ledger.process_monthly_interest().await.unwrap();
    assert_eq!(report.examined, 2);
    assert_eq!(report.accrued, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total_interest, dec("35.00"));
    assert_eq!(report.error_count(), 0);

    let alice_final = ledger.account_required(&alice_investment.id).await.unwrap();
    assert_eq!(alice_final.balance, dec("735.00"));

    // The balance always equals the sum of the record deltas, and a reload
    // from the store round-trips the snapshot.
    assert_eq!(alice_final.balance, alice_final.history_total());
    let reloaded = ledger.account_required(&alice_investment.id).await.unwrap();
    assert_eq!(reloaded.id, alice_final.id);
    assert_eq!(reloaded.balance, alice_final.balance);
    assert_eq!(reloaded.transactions.len(), alice_final.transactions.len());

    // Customer views are computed from the store, never the cache.
    assert_eq!(ledger.total_balance("alice").await.unwrap(), dec("735.00"));
    alice.account_ids.clear();
    ledger.refresh_customer_accounts(&mut alice).await.unwrap();
    assert_eq!(alice.account_ids, vec![alice_investment.id.clone()]);

    // History is listed most recent first.
    let history = ledger
        .transaction_history(&alice_investment.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, TransactionKind::Interest);

    // Open and transfer were audited.
    let events = audit.events();
    assert_eq!(
        events
            .iter()
            .filter(|e| e.action == AuditAction::OpenAccount)
            .count(),
        2
    );
    let transfers: Vec<_> = events
        .iter()
        .filter(|e| e.action == AuditAction::Transfer)
        .collect();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].status, AuditStatus::Ok);
    assert_eq!(
        transfers[0].target_id,
        format!("{}->{}", alice_investment.id, bob_cheque.id)
    );
}

#[tokio::test]
async fn unauthorized_transfer_changes_nothing() {
    let store = MemoryStore::new();
    let audit = MemoryAuditSink::new();
    let mut ledger = Ledger::new(store, audit.clone());

    let mut alice = customer("alice", "Alice", "Mokoena");
    let mut bob = customer("bob", "Bob", "van Wyk");

    let source = ledger
        .open_account(
            &mut alice,
            OpeningRequest::new(AccountType::Investment).initial_deposit(dec("1000")),
        )
        .await
        .unwrap();
    let destination = ledger
        .open_account(&mut bob, OpeningRequest::new(AccountType::Savings))
        .await
        .unwrap();

    let err = ledger
        .transfer(
            &Caller::new("mallory", "mallory@example.com"),
            TransferRequest::new(&source.id, &destination.id, dec("300")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized));

    assert_eq!(
        ledger.account_required(&source.id).await.unwrap().balance,
        dec("1000")
    );
    assert_eq!(
        ledger
            .account_required(&destination.id)
            .await
            .unwrap()
            .balance,
        BigDecimal::from(0)
    );

    let denied: Vec<_> = audit
        .events()
        .into_iter()
        .filter(|e| e.status == AuditStatus::Denied)
        .collect();
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].actor_id, "mallory");
}

#[tokio::test]
async fn variant_policies_hold_end_to_end() {
    let store = MemoryStore::new();
    let mut ledger = Ledger::new(store, MemoryAuditSink::new());
    let mut owner = customer("cust_1", "Thandi", "Nkosi");

    // Savings never pays out.
    let savings = ledger
        .open_account(
            &mut owner,
            OpeningRequest::for_tag("Savings")
                .unwrap()
                .initial_deposit(dec("400")),
        )
        .await
        .unwrap();
    let err = ledger.withdraw(&savings.id, &dec("1")).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Policy(PolicyViolation::WithdrawalsNotAllowed)
    ));

    // Money market enforces the monthly limit across persisted operations.
    let money_market = ledger
        .open_account(
            &mut owner,
            OpeningRequest::for_tag("moneymarket")
                .unwrap()
                .initial_deposit(dec("5000")),
        )
        .await
        .unwrap();
    for _ in 0..6 {
        ledger.withdraw(&money_market.id, &dec("100")).await.unwrap();
    }
    let err = ledger
        .withdraw(&money_market.id, &dec("100"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Policy(PolicyViolation::WithdrawalLimitReached { limit: 6 })
    ));

    // The accrual run resets the counter and withdrawals resume.
    ledger.process_monthly_interest().await.unwrap();
    ledger.withdraw(&money_market.id, &dec("100")).await.unwrap();

    // A certificate stays locked for its whole term.
    let certificate = ledger
        .open_account(
            &mut owner,
            OpeningRequest::for_tag("certificate of deposit")
                .unwrap()
                .initial_deposit(dec("500"))
                .term_months(12),
        )
        .await
        .unwrap();
    let err = ledger
        .withdraw(&certificate.id, &dec("10"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Policy(PolicyViolation::NotMatured { .. })
    ));
}

#[tokio::test]
async fn serialized_accounts_survive_a_json_round_trip() {
    let store = MemoryStore::new();
    let mut ledger = Ledger::new(store, MemoryAuditSink::new());
    let mut owner = customer("cust_1", "Thandi", "Nkosi");

    let account = ledger
        .open_account(
            &mut owner,
            OpeningRequest::new(AccountType::MoneyMarket).initial_deposit(dec("2500.50")),
        )
        .await
        .unwrap();
    ledger.withdraw(&account.id, &dec("350.25")).await.unwrap();

    let snapshot = ledger.account_required(&account.id).await.unwrap();
    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: banking_core::Account = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);
    assert_eq!(decoded.balance, decoded.history_total());
}
