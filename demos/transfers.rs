//! Transfer example: authorized transfers, rejections, and the audit trail

use banking_core::utils::{MemoryAuditSink, MemoryStore};
use banking_core::{AccountType, Caller, Customer, Ledger, OpeningRequest, TransferRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Banking Core - Transfer Example\n");

    let audit = MemoryAuditSink::new();
    let mut ledger = Ledger::new(MemoryStore::new(), audit.clone());

    let mut alice = Customer::new(
        "cust_alice".to_string(),
        "Alice".to_string(),
        "Mokoena".to_string(),
        "8 Harbour Rd".to_string(),
        "021-555-0101".to_string(),
        "alice@example.com".to_string(),
    );
    let mut bob = Customer::new(
        "cust_bob".to_string(),
        "Bob".to_string(),
        "van Wyk".to_string(),
        "22 Loop St".to_string(),
        "021-555-0102".to_string(),
        "bob@example.com".to_string(),
    );

    let source = ledger
        .open_account(
            &mut alice,
            OpeningRequest::new(AccountType::Investment).initial_deposit("1000.00".parse()?),
        )
        .await?;
    let destination = ledger
        .open_account(
            &mut bob,
            OpeningRequest::new(AccountType::Cheque)
                .employer("Initech", "4120 Freidrich Ln")
                .initial_deposit("200.00".parse()?),
        )
        .await?;
    println!("  Alice: {} with 1000.00", source.id);
    println!("  Bob:   {} with 200.00\n", destination.id);

    // 1. An authorized transfer moves both legs as one unit
    println!("💸 Alice sends Bob 300.00...");
    let receipt = ledger
        .transfer(
            &alice.as_caller(),
            TransferRequest::new(&source.id, &destination.id, "300.00".parse()?)
                .description("rent share"),
        )
        .await?;
    println!(
        "  ✓ Withdrawal {} on {}, deposit {} on {}",
        receipt.withdrawal.id, receipt.source_id, receipt.deposit.id, receipt.destination_id
    );
    println!(
        "  Balances now: Alice {}, Bob {}\n",
        ledger.account_required(&source.id).await?.balance,
        ledger.account_required(&destination.id).await?.balance
    );

    // 2. Every rejection names the failed precondition
    println!("🚫 Rejected transfers:");
    let attempts = [
        ("zero amount", TransferRequest::new(&source.id, &destination.id, "0".parse()?)),
        (
            "same account",
            TransferRequest::new(&source.id, &source.id, "10.00".parse()?),
        ),
        (
            "unknown destination",
            TransferRequest::new(&source.id, "CHQ_missing", "10.00".parse()?),
        ),
        (
            "below the investment minimum",
            TransferRequest::new(&source.id, &destination.id, "650.00".parse()?),
        ),
    ];
    for (label, request) in attempts {
        if let Err(err) = ledger.transfer(&alice.as_caller(), request).await {
            println!("  ✗ {label}: {err}");
        }
    }

    // An unauthorized caller is turned away before any state changes.
    let mallory = Caller::new("cust_mallory", "mallory@example.com");
    if let Err(err) = ledger
        .transfer(
            &mallory,
            TransferRequest::new(&source.id, &destination.id, "50.00".parse()?),
        )
        .await
    {
        println!("  ✗ stranger's attempt: {err}\n");
    }

    // 3. The audit trail shows who did what
    println!("🗒️  Audit trail:");
    for event in audit.events() {
        println!(
            "  [{}] {} {} {} -> {}",
            event.status.as_str(),
            event.actor_label,
            event.action.as_str(),
            event.target_id,
            event.details
        );
    }

    Ok(())
}
